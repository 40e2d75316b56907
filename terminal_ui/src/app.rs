use chrono::NaiveDate;
use crossterm::event::KeyCode;
use todo_shared::{Todo, TodoFilter, TodoId, TodoStats};

use crate::form::{FormOutcome, Submission, TodoForm};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InputMode {
    Normal,
    Search,
    Form,
}

/// Work the event loop has to perform against the API.
#[derive(Debug, PartialEq, Clone)]
pub enum Action {
    Reload,
    Toggle(TodoId),
    Delete(TodoId),
    /// Fetch the latest copy of a todo and open it in the form.
    Edit(TodoId),
    Save(Submission),
    Quit,
}

pub struct App {
    pub todos: Vec<Todo>,
    pub filter: TodoFilter,
    pub selected: usize,
    pub mode: InputMode,
    pub form: Option<TodoForm>,
    pub status: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            todos: Vec::new(),
            filter: TodoFilter::default(),
            selected: 0,
            mode: InputMode::Normal,
            form: None,
            status: "loading...".to_string(),
        }
    }

    pub fn visible(&self) -> Vec<&Todo> {
        self.filter.apply(&self.todos)
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.visible().get(self.selected).copied()
    }

    pub fn stats(&self, today: NaiveDate) -> TodoStats {
        TodoStats::collect(&self.todos, today)
    }

    pub fn replace_todos(&mut self, todos: Vec<Todo>) {
        self.todos = todos;
        self.clamp_selection();
    }

    pub fn upsert(&mut self, todo: Todo) {
        match self.todos.iter_mut().find(|existing| existing.id == todo.id) {
            Some(existing) => *existing = todo,
            None => self.todos.insert(0, todo),
        }
        self.clamp_selection();
    }

    pub fn remove(&mut self, id: TodoId) {
        self.todos.retain(|todo| todo.id != id);
        self.clamp_selection();
    }

    pub fn open_form(&mut self, form: TodoForm) {
        self.form = Some(form);
        self.mode = InputMode::Form;
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Option<Action> {
        match self.mode {
            InputMode::Normal => self.handle_normal_key(code),
            InputMode::Search => {
                self.handle_search_key(code);
                None
            }
            InputMode::Form => self.handle_form_key(code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> Option<Action> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < self.visible().len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Char(' ') => self.selected_todo().map(|todo| Action::Toggle(todo.id)),
            KeyCode::Char('d') => self.selected_todo().map(|todo| Action::Delete(todo.id)),
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char('s') => {
                self.filter.status = self.filter.status.next();
                self.clamp_selection();
                None
            }
            KeyCode::Char('p') => {
                self.filter.priority = self.filter.priority.next();
                self.clamp_selection();
                None
            }
            KeyCode::Char('/') => {
                self.mode = InputMode::Search;
                None
            }
            KeyCode::Char('a') => {
                self.open_form(TodoForm::blank());
                None
            }
            KeyCode::Char('e') => self.selected_todo().map(|todo| Action::Edit(todo.id)),
            _ => None,
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter | KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.filter.search.pop();
            }
            KeyCode::Char(c) => self.filter.search.push(c),
            _ => {}
        }
        self.clamp_selection();
    }

    fn handle_form_key(&mut self, code: KeyCode) -> Option<Action> {
        let form = self.form.as_mut()?;
        match form.handle_key(code) {
            FormOutcome::Editing => None,
            FormOutcome::Invalid(message) => {
                self.status = message.to_string();
                None
            }
            FormOutcome::Cancelled => {
                self.close_form();
                None
            }
            FormOutcome::Submitted(submission) => {
                self.close_form();
                Some(Action::Save(submission))
            }
        }
    }

    fn close_form(&mut self) {
        self.form = None;
        self.mode = InputMode::Normal;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use todo_shared::{CreateTodoRequest, Priority, StatusFilter, UpdateTodoRequest};

    fn todo(id: TodoId, title: &str, completed: bool) -> Todo {
        let now = Utc::now();
        Todo {
            id,
            title: title.to_string(),
            description: None,
            completed,
            priority: Priority::Medium,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn selection_drives_toggle_and_delete() {
        let mut app = App::new();
        app.replace_todos(vec![todo(3, "c", false), todo(2, "b", false)]);

        assert_eq!(app.handle_key(KeyCode::Char(' ')), Some(Action::Toggle(3)));
        app.handle_key(KeyCode::Char('j'));
        app.handle_key(KeyCode::Char('j'));
        assert_eq!(app.selected, 1);
        assert_eq!(app.handle_key(KeyCode::Char('d')), Some(Action::Delete(2)));
    }

    #[test]
    fn empty_list_has_nothing_to_act_on() {
        let mut app = App::new();
        assert_eq!(app.handle_key(KeyCode::Char(' ')), None);
        assert_eq!(app.handle_key(KeyCode::Char('d')), None);
        assert_eq!(app.handle_key(KeyCode::Char('q')), Some(Action::Quit));
    }

    #[test]
    fn status_filter_shrinks_selection() {
        let mut app = App::new();
        app.replace_todos(vec![todo(2, "done", true), todo(1, "open", false)]);
        app.selected = 1;

        app.handle_key(KeyCode::Char('s'));
        assert_eq!(app.filter.status, StatusFilter::Pending);
        assert_eq!(app.selected, 0);
        assert_eq!(app.selected_todo().map(|todo| todo.id), Some(1));
    }

    #[test]
    fn search_mode_edits_filter_text() {
        let mut app = App::new();
        app.replace_todos(vec![todo(2, "Groceries", false), todo(1, "Call mom", false)]);

        app.handle_key(KeyCode::Char('/'));
        for c in "gro".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.mode, InputMode::Normal);
        let ids: Vec<TodoId> = app.visible().iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![2]);
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn add_form_requires_title_and_sends_every_field() {
        let mut app = App::new();
        app.handle_key(KeyCode::Char('a'));
        assert_eq!(app.mode, InputMode::Form);
        assert_eq!(app.handle_key(KeyCode::Enter), None);
        assert_eq!(app.status, "Title is required");
        assert_eq!(app.mode, InputMode::Form);

        type_text(&mut app, " Buy milk");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "2 litres");
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "2030-01-15");

        let expected = CreateTodoRequest {
            title: Some("Buy milk".to_string()),
            description: Some("2 litres".to_string()),
            priority: Some(Priority::High),
            due_date: NaiveDate::from_ymd_opt(2030, 1, 15),
        };
        assert_eq!(
            app.handle_key(KeyCode::Enter),
            Some(Action::Save(Submission::Create(expected)))
        );
        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.form.is_none());
    }

    #[test]
    fn edit_key_asks_for_the_selected_todo() {
        let mut app = App::new();
        assert_eq!(app.handle_key(KeyCode::Char('e')), None);

        app.replace_todos(vec![todo(3, "c", false), todo(2, "b", false)]);
        app.handle_key(KeyCode::Char('j'));
        assert_eq!(app.handle_key(KeyCode::Char('e')), Some(Action::Edit(2)));
        assert_eq!(app.mode, InputMode::Normal);
    }

    #[test]
    fn edit_form_replaces_every_field_and_keeps_completed() {
        let mut app = App::new();
        let mut current = todo(7, "Draft report", true);
        current.description = Some("first pass".to_string());
        current.priority = Priority::Low;
        current.due_date = NaiveDate::from_ymd_opt(2030, 3, 1);
        app.open_form(TodoForm::edit(&current));

        type_text(&mut app, " v2");
        app.handle_key(KeyCode::Tab);
        for _ in 0.."first pass".len() {
            app.handle_key(KeyCode::Backspace);
        }
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Tab);
        for _ in 0.."2030-03-01".len() {
            app.handle_key(KeyCode::Backspace);
        }

        let expected = UpdateTodoRequest {
            title: Some("Draft report v2".to_string()),
            description: None,
            completed: Some(true),
            priority: Some(Priority::Low),
            due_date: None,
        };
        assert_eq!(
            app.handle_key(KeyCode::Enter),
            Some(Action::Save(Submission::Update(7, expected)))
        );
        assert_eq!(app.mode, InputMode::Normal);
    }

    #[test]
    fn edit_form_blank_title_stays_open_and_esc_cancels() {
        let mut app = App::new();
        app.open_form(TodoForm::edit(&todo(4, "abc", false)));
        for _ in 0..3 {
            app.handle_key(KeyCode::Backspace);
        }
        assert_eq!(app.handle_key(KeyCode::Enter), None);
        assert_eq!(app.status, "Title is required");
        assert_eq!(app.mode, InputMode::Form);

        assert_eq!(app.handle_key(KeyCode::Esc), None);
        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.form.is_none());
        assert_eq!(app.handle_key(KeyCode::Char('q')), Some(Action::Quit));
    }

    #[test]
    fn upsert_replaces_or_prepends() {
        let mut app = App::new();
        app.replace_todos(vec![todo(1, "old", false)]);

        app.upsert(todo(1, "old", true));
        assert!(app.todos[0].completed);

        app.upsert(todo(2, "new", false));
        assert_eq!(app.todos[0].id, 2);

        app.remove(1);
        assert_eq!(app.todos.len(), 1);
    }
}
