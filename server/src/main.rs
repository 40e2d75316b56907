use actix_web::HttpServer;
use log::{error, info};
use std::io;
use std::sync::Arc;
use todo_server::logging::init_logging;
use todo_server::{build_app, DatabaseLocation, ServerConfig, SqliteTodoStore, TodoStore};

fn open_store(location: &DatabaseLocation) -> io::Result<SqliteTodoStore> {
    let opened = match location {
        DatabaseLocation::File(path) => SqliteTodoStore::open(path),
        DatabaseLocation::InMemory => SqliteTodoStore::open_in_memory(),
    };

    opened.map_err(|err| {
        error!("event=server_start module=server status=error error_code=store_open_failed error={err}");
        io::Error::new(io::ErrorKind::Other, format!("failed to open database `{location}`: {err}"))
    })
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    init_logging();

    let config = ServerConfig::from_env()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    let store: Arc<dyn TodoStore> = Arc::new(open_store(&config.database)?);

    info!(
        "event=server_start module=server status=ok host={} port={} database={}",
        config.host, config.port, config.database
    );

    HttpServer::new(move || build_app(Arc::clone(&store)))
        .bind(config.bind_address())?
        .run()
        .await
}
