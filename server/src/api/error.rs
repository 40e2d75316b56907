use crate::store::{StoreError, ValidationError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use std::fmt::{Display, Formatter};
use todo_shared::ErrorBody;

pub const TODO_NOT_FOUND: &str = "Todo not found";
pub const ROUTE_NOT_FOUND: &str = "Not found";

/// Every failure leaves the API as `{"error": "<message>"}` with a matching
/// status code.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(&'static str),
    Internal(String),
}

impl ApiError {
    pub fn todo_not_found() -> Self {
        Self::NotFound(TODO_NOT_FOUND)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message: &str = match self {
            Self::BadRequest(message) | Self::Internal(message) => message,
            Self::NotFound(message) => message,
        };
        f.write_str(message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::BadRequest(value.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => err.into(),
            other => {
                error!("event=api_request module=api status=error error_code=store_failure error={other}");
                Self::Internal(other.to_string())
            }
        }
    }
}
