//! HTTP surface under `/api`.
//!
//! The store arrives as injected `web::Data<dyn TodoStore>`; handlers keep no
//! state between requests.

use crate::store::TodoStore;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::{get, middleware, web, App, HttpRequest, HttpResponse, Responder, ResponseError};
use log::warn;
use std::sync::Arc;

mod error;
mod todos;

pub use error::{ApiError, ROUTE_NOT_FOUND, TODO_NOT_FOUND};

pub const HEALTH_MESSAGE: &str = "Server is running!";

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(todo_shared::MessageBody {
        message: HEALTH_MESSAGE.to_string(),
    })
}

/// Answers CORS preflights and turns unknown routes into a JSON 404.
async fn fallback(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        return HttpResponse::NoContent().finish();
    }

    ApiError::NotFound(ROUTE_NOT_FOUND).error_response()
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        warn!(
            "event=api_request module=api status=rejected path={} error_code=bad_json error={err}",
            req.path()
        );
        ApiError::BadRequest(err.to_string()).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_, _| ApiError::todo_not_found().into())
}

fn cors_headers() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add((
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, PATCH, DELETE, OPTIONS",
        ))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(web::scope("/api").service(health).configure(todos::configure))
        .default_service(web::route().to(fallback));
}

/// Builds the application around `store`, shared by the binary and tests.
pub fn build_app(
    store: Arc<dyn TodoStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    App::new()
        .app_data(web::Data::from(store))
        .wrap(cors_headers())
        .wrap(middleware::Logger::default())
        .configure(configure)
}
