//! Client-side narrowing and summary of a fetched todo list.

use chrono::NaiveDate;

use crate::{Priority, Todo};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Pending,
            StatusFilter::Pending => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
        }
    }

    fn matches(self, completed: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !completed,
            StatusFilter::Completed => completed,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    /// Cycles all -> high -> medium -> low -> all.
    pub fn next(self) -> Self {
        match self {
            PriorityFilter::All => PriorityFilter::Only(Priority::High),
            PriorityFilter::Only(Priority::High) => PriorityFilter::Only(Priority::Medium),
            PriorityFilter::Only(Priority::Medium) => PriorityFilter::Only(Priority::Low),
            PriorityFilter::Only(Priority::Low) => PriorityFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityFilter::All => "all",
            PriorityFilter::Only(priority) => priority.as_str(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TodoFilter {
    pub search: String,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

impl TodoFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        self.matches_search(todo)
            && self.status.matches(todo.completed)
            && match self.priority {
                PriorityFilter::All => true,
                PriorityFilter::Only(priority) => todo.priority == priority,
            }
    }

    pub fn apply<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        todos.iter().filter(|todo| self.matches(todo)).collect()
    }

    fn matches_search(&self, todo: &Todo) -> bool {
        let needle = self.search.to_lowercase();
        if needle.is_empty() {
            return true;
        }

        todo.title.to_lowercase().contains(&needle)
            || todo
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

impl TodoStats {
    /// Overdue counts open todos whose due date lies strictly before `today`.
    pub fn collect(todos: &[Todo], today: NaiveDate) -> Self {
        let completed = todos.iter().filter(|todo| todo.completed).count();
        let overdue = todos
            .iter()
            .filter(|todo| !todo.completed && todo.due_date.is_some_and(|due| due < today))
            .count();

        Self {
            total: todos.len(),
            completed,
            pending: todos.len() - completed,
            overdue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn todo(id: i64, title: &str, completed: bool, priority: Priority) -> Todo {
        let now = Utc::now();
        Todo {
            id,
            title: title.to_string(),
            description: None,
            completed,
            priority,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let mut with_description = todo(2, "Groceries", false, Priority::Low);
        with_description.description = Some("Buy MILK and eggs".to_string());
        let todos = vec![todo(1, "Call Bob", false, Priority::High), with_description];

        let filter = TodoFilter {
            search: "milk".to_string(),
            ..TodoFilter::default()
        };
        let ids: Vec<i64> = filter.apply(&todos).iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![2]);

        let filter = TodoFilter {
            search: "BOB".to_string(),
            ..TodoFilter::default()
        };
        let ids: Vec<i64> = filter.apply(&todos).iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn status_and_priority_filters_combine() {
        let todos = vec![
            todo(1, "a", true, Priority::High),
            todo(2, "b", false, Priority::High),
            todo(3, "c", false, Priority::Low),
        ];

        let filter = TodoFilter {
            status: StatusFilter::Pending,
            priority: PriorityFilter::Only(Priority::High),
            ..TodoFilter::default()
        };
        let ids: Vec<i64> = filter.apply(&todos).iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![2]);

        let filter = TodoFilter {
            status: StatusFilter::Completed,
            ..TodoFilter::default()
        };
        assert_eq!(filter.apply(&todos).len(), 1);
        assert_eq!(TodoFilter::default().apply(&todos).len(), 3);
    }

    #[test]
    fn filters_cycle_back_to_all() {
        let mut status = StatusFilter::All;
        for _ in 0..3 {
            status = status.next();
        }
        assert_eq!(status, StatusFilter::All);

        let mut priority = PriorityFilter::All;
        for _ in 0..4 {
            priority = priority.next();
        }
        assert_eq!(priority, PriorityFilter::All);
    }

    #[test]
    fn stats_count_overdue_only_for_open_todos() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2025, 6, 9);

        let mut late_open = todo(1, "late", false, Priority::Medium);
        late_open.due_date = yesterday;
        let mut late_done = todo(2, "done", true, Priority::Medium);
        late_done.due_date = yesterday;
        let mut due_today = todo(3, "today", false, Priority::Medium);
        due_today.due_date = Some(today);

        let stats = TodoStats::collect(&[late_open, late_done, due_today], today);
        assert_eq!(
            stats,
            TodoStats {
                total: 3,
                completed: 1,
                pending: 2,
                overdue: 1,
            }
        );
    }
}
