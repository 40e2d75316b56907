use crossterm::event::KeyCode;
use todo_shared::{parse_due_date, CreateTodoRequest, Priority, Todo, TodoId, UpdateTodoRequest};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FormField {
    Title,
    Description,
    Priority,
    DueDate,
}

impl FormField {
    const ORDER: [FormField; 4] = [
        FormField::Title,
        FormField::Description,
        FormField::Priority,
        FormField::DueDate,
    ];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Priority => "priority",
            Self::DueDate => "due",
        }
    }
}

/// What a submitted form turns into.
#[derive(Debug, PartialEq, Clone)]
pub enum Submission {
    Create(CreateTodoRequest),
    Update(TodoId, UpdateTodoRequest),
}

/// Editable copy of a todo. `target` is set when editing an existing one.
#[derive(Debug, Clone)]
pub struct TodoForm {
    pub target: Option<TodoId>,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub focus: FormField,
    completed: bool,
}

pub enum FormOutcome {
    Editing,
    Cancelled,
    Invalid(&'static str),
    Submitted(Submission),
}

impl TodoForm {
    pub fn blank() -> Self {
        Self {
            target: None,
            title: String::new(),
            description: String::new(),
            priority: Priority::default(),
            due_date: String::new(),
            focus: FormField::Title,
            completed: false,
        }
    }

    pub fn edit(todo: &Todo) -> Self {
        Self {
            target: Some(todo.id),
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            priority: todo.priority,
            due_date: todo
                .due_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            focus: FormField::Title,
            completed: todo.completed,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> FormOutcome {
        match code {
            KeyCode::Esc => return FormOutcome::Cancelled,
            KeyCode::Enter => return self.submit(),
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Left if self.focus == FormField::Priority => {
                self.priority = cycle_priority(self.priority, -1)
            }
            KeyCode::Right | KeyCode::Char(' ') if self.focus == FormField::Priority => {
                self.priority = cycle_priority(self.priority, 1)
            }
            KeyCode::Backspace => {
                if let Some(text) = self.focused_text() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.focused_text() {
                    text.push(c);
                }
            }
            _ => {}
        }
        FormOutcome::Editing
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::DueDate => Some(&mut self.due_date),
            FormField::Priority => None,
        }
    }

    fn submit(&self) -> FormOutcome {
        let title = self.title.trim();
        if title.is_empty() {
            return FormOutcome::Invalid("Title is required");
        }
        let due = self.due_date.trim();
        let due_date = if due.is_empty() {
            None
        } else {
            match parse_due_date(due) {
                Some(date) => Some(date),
                None => return FormOutcome::Invalid("Invalid due date"),
            }
        };
        let description = Some(self.description.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        let submission = match self.target {
            None => Submission::Create(CreateTodoRequest {
                title: Some(title.to_string()),
                description,
                priority: Some(self.priority),
                due_date,
            }),
            Some(id) => Submission::Update(
                id,
                UpdateTodoRequest {
                    title: Some(title.to_string()),
                    description,
                    completed: Some(self.completed),
                    priority: Some(self.priority),
                    due_date,
                },
            ),
        };
        FormOutcome::Submitted(submission)
    }
}

fn cycle_priority(priority: Priority, step: isize) -> Priority {
    let len = Priority::ALL.len() as isize;
    let index = Priority::ALL
        .iter()
        .position(|candidate| *candidate == priority)
        .unwrap_or(0) as isize;
    Priority::ALL[(index + step).rem_euclid(len) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_wraps_both_ways() {
        assert_eq!(FormField::DueDate.next(), FormField::Title);
        assert_eq!(FormField::Title.prev(), FormField::DueDate);
        assert_eq!(FormField::Description.next(), FormField::Priority);
    }

    #[test]
    fn priority_cycles_on_its_field_only() {
        let mut form = TodoForm::blank();
        form.handle_key(KeyCode::Char(' '));
        assert_eq!(form.priority, Priority::Medium);
        assert_eq!(form.title, " ");

        form.focus = FormField::Priority;
        let start = form.priority;
        form.handle_key(KeyCode::Right);
        assert_ne!(form.priority, start);
        form.handle_key(KeyCode::Left);
        assert_eq!(form.priority, start);
    }

    #[test]
    fn bad_due_date_keeps_form_open() {
        let mut form = TodoForm::blank();
        form.title = "Pay rent".to_string();
        form.due_date = "next week".to_string();
        assert!(matches!(
            form.handle_key(KeyCode::Enter),
            FormOutcome::Invalid("Invalid due date")
        ));
    }
}
