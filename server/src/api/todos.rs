use super::error::ApiError;
use crate::store::{validate_title, NewTodo, TodoChanges, TodoStore, ValidationError};
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use todo_shared::{CreateTodoRequest, MessageBody, TodoId, UpdateTodoRequest};

type Store = web::Data<dyn TodoStore>;

#[get("/todos")]
async fn list_todos(store: Store) -> Result<HttpResponse, ApiError> {
    let todos = store.find_all()?;
    Ok(HttpResponse::Ok().json(todos))
}

#[get("/todos/{id}")]
async fn get_todo(store: Store, path: web::Path<TodoId>) -> Result<HttpResponse, ApiError> {
    let todo = store
        .find_by_id(path.into_inner())?
        .ok_or_else(ApiError::todo_not_found)?;
    Ok(HttpResponse::Ok().json(todo))
}

#[post("/todos")]
async fn create_todo(
    store: Store,
    body: web::Json<CreateTodoRequest>,
) -> Result<HttpResponse, ApiError> {
    let todo = store.create(new_todo(body.into_inner())?)?;
    Ok(HttpResponse::Created().json(todo))
}

/// Existence is checked before the body's title so an unknown id always
/// answers 404.
#[put("/todos/{id}")]
async fn update_todo(
    store: Store,
    path: web::Path<TodoId>,
    body: web::Json<UpdateTodoRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if store.find_by_id(id)?.is_none() {
        return Err(ApiError::todo_not_found());
    }

    let todo = store
        .update(id, todo_changes(body.into_inner())?)?
        .ok_or_else(ApiError::todo_not_found)?;
    Ok(HttpResponse::Ok().json(todo))
}

#[delete("/todos/{id}")]
async fn delete_todo(store: Store, path: web::Path<TodoId>) -> Result<HttpResponse, ApiError> {
    if !store.delete(path.into_inner())? {
        return Err(ApiError::todo_not_found());
    }

    Ok(HttpResponse::Ok().json(MessageBody {
        message: "Todo deleted successfully".to_string(),
    }))
}

#[patch("/todos/{id}/toggle")]
async fn toggle_todo(store: Store, path: web::Path<TodoId>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if store.find_by_id(id)?.is_none() {
        return Err(ApiError::todo_not_found());
    }

    let todo = store
        .toggle_complete(id)?
        .ok_or_else(ApiError::todo_not_found)?;
    Ok(HttpResponse::Ok().json(todo))
}

fn new_todo(request: CreateTodoRequest) -> Result<NewTodo, ValidationError> {
    let title = validate_title(request.title.as_deref().unwrap_or_default())?;

    Ok(NewTodo {
        title: title.to_string(),
        description: request.description,
        priority: request.priority.unwrap_or_default(),
        due_date: request.due_date,
    })
}

/// Omitted fields reset to their creation defaults.
fn todo_changes(request: UpdateTodoRequest) -> Result<TodoChanges, ValidationError> {
    let title = validate_title(request.title.as_deref().unwrap_or_default())?;

    Ok(TodoChanges {
        title: title.to_string(),
        description: request.description,
        completed: request.completed.unwrap_or(false),
        priority: request.priority.unwrap_or_default(),
        due_date: request.due_date,
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_todos)
        .service(get_todo)
        .service(create_todo)
        .service(update_todo)
        .service(delete_todo)
        .service(toggle_todo);
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_shared::Priority;

    #[test]
    fn create_request_fills_defaults() {
        let request = CreateTodoRequest {
            title: Some("  Buy milk ".to_string()),
            ..CreateTodoRequest::default()
        };

        let todo = new_todo(request).unwrap();
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.description, None);
    }

    #[test]
    fn missing_title_is_a_validation_error() {
        assert_eq!(
            new_todo(CreateTodoRequest::default()),
            Err(ValidationError::TitleRequired)
        );
        assert_eq!(
            todo_changes(UpdateTodoRequest::default()),
            Err(ValidationError::TitleRequired)
        );
    }

    #[test]
    fn update_request_replaces_every_field() {
        let request = UpdateTodoRequest {
            title: Some("Renamed".to_string()),
            ..UpdateTodoRequest::default()
        };

        let changes = todo_changes(request).unwrap();
        assert_eq!(
            changes,
            TodoChanges {
                title: "Renamed".to_string(),
                description: None,
                completed: false,
                priority: Priority::Medium,
                due_date: None,
            }
        );
    }
}
