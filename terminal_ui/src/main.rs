use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{io, time::Duration};
use tokio::runtime::Runtime;
use tui::{backend::CrosstermBackend, Terminal};

mod app;
mod client;
mod form;
mod ui;

use app::{Action, App};
use client::ApiClient;
use form::{Submission, TodoForm};

const TICK: Duration = Duration::from_millis(250);

fn reload(runtime: &Runtime, client: &ApiClient, app: &mut App) {
    match runtime.block_on(client.list_todos()) {
        Ok(todos) => {
            app.status = format!("loaded {} todos", todos.len());
            app.replace_todos(todos);
        }
        Err(err) => app.status = format!("failed to load todos: {err}"),
    }
}

/// Runs one API call for `action`. Returns false when the user asked to quit.
fn perform(runtime: &Runtime, client: &ApiClient, app: &mut App, action: Action) -> bool {
    match action {
        Action::Quit => return false,
        Action::Reload => reload(runtime, client, app),
        Action::Toggle(id) => match runtime.block_on(client.toggle_todo(id)) {
            Ok(todo) => {
                app.status = if todo.completed {
                    "todo completed".to_string()
                } else {
                    "todo reopened".to_string()
                };
                app.upsert(todo);
            }
            Err(err) => app.status = format!("failed to update todo: {err}"),
        },
        Action::Delete(id) => match runtime.block_on(client.delete_todo(id)) {
            Ok(()) => {
                app.remove(id);
                app.status = "todo deleted".to_string();
            }
            Err(err) => app.status = format!("failed to delete todo: {err}"),
        },
        Action::Edit(id) => match runtime.block_on(client.get_todo(id)) {
            Ok(todo) => {
                app.open_form(TodoForm::edit(&todo));
                app.upsert(todo);
                app.status = "editing todo".to_string();
            }
            Err(err) => {
                if err.is_not_found() {
                    app.remove(id);
                }
                app.status = format!("failed to load todo: {err}");
            }
        },
        Action::Save(Submission::Create(request)) => {
            match runtime.block_on(client.create_todo(&request)) {
                Ok(todo) => {
                    app.upsert(todo);
                    app.status = "todo created".to_string();
                }
                Err(err) => app.status = format!("failed to create todo: {err}"),
            }
        }
        Action::Save(Submission::Update(id, request)) => {
            match runtime.block_on(client.update_todo(id, &request)) {
                Ok(todo) => {
                    app.upsert(todo);
                    app.status = "todo updated".to_string();
                }
                Err(err) => {
                    if err.is_not_found() {
                        app.remove(id);
                    }
                    app.status = format!("failed to update todo: {err}");
                }
            }
        }
    }
    true
}

fn run<B: tui::backend::Backend>(
    terminal: &mut Terminal<B>,
    runtime: &Runtime,
    client: &ApiClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new();
    reload(runtime, client, &mut app);

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(action) = app.handle_key(key.code) {
            if !perform(runtime, client, &mut app, action) {
                return Ok(());
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::new()?;
    let client = ApiClient::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run(&mut terminal, &runtime, &client);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
