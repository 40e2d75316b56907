use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt::{Display, Formatter};
use todo_shared::{CreateTodoRequest, ErrorBody, Todo, TodoId, UpdateTodoRequest};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug)]
pub enum ClientError {
    Http(reqwest::Error),
    Api { status: StatusCode, message: String },
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "request failed: {err}"),
            Self::Api { status, message } => write!(f, "{status}: {message}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Uses `TODO_API_URL` when set.
    pub fn from_env() -> Self {
        Self::new(std::env::var("TODO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()))
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        let response = self.http.get(self.url("/todos")).send().await?;
        decode(response).await
    }

    pub async fn get_todo(&self, id: TodoId) -> Result<Todo, ClientError> {
        let response = self.http.get(self.url(&format!("/todos/{id}"))).send().await?;
        decode(response).await
    }

    pub async fn create_todo(&self, request: &CreateTodoRequest) -> Result<Todo, ClientError> {
        let response = self
            .http
            .post(self.url("/todos"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    /// Replaces every field of the todo; see `UpdateTodoRequest`.
    pub async fn update_todo(
        &self,
        id: TodoId,
        request: &UpdateTodoRequest,
    ) -> Result<Todo, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/todos/{id}")))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn toggle_todo(&self, id: TodoId) -> Result<Todo, ClientError> {
        let response = self
            .http
            .patch(self.url(&format!("/todos/{id}/toggle")))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete_todo(&self, id: TodoId) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/todos/{id}")))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(api_error(status, response.text().await?))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    Err(api_error(status, response.text().await?))
}

/// Prefers the server's `{"error": ...}` message over the raw body.
fn api_error(status: StatusCode, body: String) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|parsed| parsed.error)
        .unwrap_or(body);
    ClientError::Api { status, message }
}
