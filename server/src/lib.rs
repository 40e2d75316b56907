pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod store;

pub use api::build_app;
pub use config::{DatabaseLocation, ServerConfig};
pub use store::{NewTodo, SqliteTodoStore, StoreError, TodoChanges, TodoStore};
