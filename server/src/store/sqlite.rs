use super::{validate_title, NewTodo, StoreError, StoreResult, TodoChanges, TodoStore};
use crate::db::{open_db, open_db_in_memory};
use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use todo_shared::{Priority, Todo, TodoId};

const TODO_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    completed,
    priority,
    due_date,
    created_at,
    updated_at
FROM todos";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed store. One connection, serialized behind a mutex; every
/// mutation runs in its own transaction.
pub struct SqliteTodoStore {
    conn: Mutex<Connection>,
}

impl SqliteTodoStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            error!("event=store_lock module=store status=error error_code=lock_poisoned");
            StoreError::Unavailable("connection lock poisoned".to_string())
        })
    }
}

impl TodoStore for SqliteTodoStore {
    fn find_all(&self) -> StoreResult<Vec<Todo>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{TODO_SELECT_SQL} ORDER BY created_at DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut todos = Vec::new();

        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        debug!(
            "event=todo_list module=store status=ok count={}",
            todos.len()
        );
        Ok(todos)
    }

    fn find_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let conn = self.lock()?;
        select_by_id(&conn, id)
    }

    fn create(&self, todo: NewTodo) -> StoreResult<Todo> {
        let title = validate_title(&todo.title)?;
        let now = format_timestamp(current_timestamp());

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO todos (
                title,
                description,
                completed,
                priority,
                due_date,
                created_at,
                updated_at
            ) VALUES (?1, ?2, 0, ?3, ?4, ?5, ?5);",
            params![
                title,
                todo.description.as_deref(),
                todo.priority.as_str(),
                todo.due_date.map(format_date),
                now,
            ],
        )?;

        let id = tx.last_insert_rowid();
        let created = select_by_id(&tx, id)?.ok_or_else(|| {
            StoreError::InvalidData(format!("inserted todo {id} could not be read back"))
        })?;
        tx.commit()?;

        info!("event=todo_create module=store status=ok id={id}");
        Ok(created)
    }

    fn update(&self, id: TodoId, changes: TodoChanges) -> StoreResult<Option<Todo>> {
        let title = validate_title(&changes.title)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let Some(previous) = select_updated_at(&tx, id)? else {
            debug!("event=todo_update module=store status=absent id={id}");
            return Ok(None);
        };

        tx.execute(
            "UPDATE todos
             SET
                title = ?1,
                description = ?2,
                completed = ?3,
                priority = ?4,
                due_date = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                title,
                changes.description.as_deref(),
                bool_to_int(changes.completed),
                changes.priority.as_str(),
                changes.due_date.map(format_date),
                format_timestamp(next_timestamp(previous)),
                id,
            ],
        )?;
        let updated = select_by_id(&tx, id)?;
        tx.commit()?;

        info!("event=todo_update module=store status=ok id={id}");
        Ok(updated)
    }

    fn toggle_complete(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let Some(previous) = select_updated_at(&tx, id)? else {
            debug!("event=todo_toggle module=store status=absent id={id}");
            return Ok(None);
        };

        tx.execute(
            "UPDATE todos
             SET
                completed = 1 - completed,
                updated_at = ?1
             WHERE id = ?2;",
            params![format_timestamp(next_timestamp(previous)), id],
        )?;
        let toggled = select_by_id(&tx, id)?;
        tx.commit()?;

        info!("event=todo_toggle module=store status=ok id={id}");
        Ok(toggled)
    }

    fn delete(&self, id: TodoId) -> StoreResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM todos WHERE id = ?1;", [id])?;

        if changed == 0 {
            debug!("event=todo_delete module=store status=absent id={id}");
            return Ok(false);
        }

        info!("event=todo_delete module=store status=ok id={id}");
        Ok(true)
    }
}

fn select_by_id(conn: &Connection, id: TodoId) -> StoreResult<Option<Todo>> {
    let mut stmt = conn.prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_todo_row(row)?));
    }

    Ok(None)
}

fn select_updated_at(conn: &Connection, id: TodoId) -> StoreResult<Option<DateTime<Utc>>> {
    let raw = conn
        .query_row(
            "SELECT updated_at FROM todos WHERE id = ?1;",
            [id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    raw.map(|value| parse_timestamp(&value, "updated_at"))
        .transpose()
}

fn parse_todo_row(row: &Row<'_>) -> StoreResult<Todo> {
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid completed value `{other}` in todos.completed"
            )));
        }
    };

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid priority `{priority_text}` in todos.priority"
        ))
    })?;

    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(value) => Some(NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|_| {
            StoreError::InvalidData(format!("invalid due date `{value}` in todos.due_date"))
        })?),
        None => None,
    };

    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Todo {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        completed,
        priority,
        due_date,
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

fn current_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Never returns a value at or before `previous`, even when the clock has
/// not advanced past the storage resolution.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    current_timestamp().max(previous + Duration::milliseconds(1))
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(value: &str, column: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            StoreError::InvalidData(format!("invalid timestamp `{value}` in todos.{column}"))
        })
}

fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_timestamp_is_strictly_after_previous() {
        let future = current_timestamp() + Duration::seconds(60);
        assert_eq!(next_timestamp(future), future + Duration::milliseconds(1));

        let past = current_timestamp() - Duration::seconds(60);
        assert!(next_timestamp(past) > past + Duration::milliseconds(1));
    }

    #[test]
    fn stored_timestamps_sort_lexicographically() {
        let earlier = DateTime::parse_from_rfc3339("2025-01-01T09:59:59.999Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = earlier + Duration::milliseconds(1);

        let (a, b) = (format_timestamp(earlier), format_timestamp(later));
        assert_eq!(a, "2025-01-01T09:59:59.999Z");
        assert_eq!(b, "2025-01-01T10:00:00.000Z");
        assert!(a < b);
        assert_eq!(parse_timestamp(&b, "created_at").unwrap(), later);
    }

    #[test]
    fn corrupt_completed_flag_is_reported() {
        let store = SqliteTodoStore::open_in_memory().unwrap();
        let created = store.create(NewTodo::new("flag")).unwrap();
        {
            let conn = store.lock().unwrap();
            conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
                .unwrap();
            conn.execute("UPDATE todos SET completed = 7 WHERE id = ?1;", [created.id])
                .unwrap();
        }

        match store.find_by_id(created.id) {
            Err(StoreError::InvalidData(message)) => assert!(message.contains("completed")),
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }
}
