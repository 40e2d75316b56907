use crate::app::{App, InputMode};
use crate::form::{FormField, TodoForm};
use chrono::Local;
use todo_shared::{Priority, Todo};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

const HELP: &str =
    "j/k move  space toggle  d delete  a add  e edit  / search  s status  p priority  r reload  q quit";
const FORM_HELP: &str = "tab/up/down field  left/right priority  enter save  esc cancel";

pub fn draw<B: Backend>(f: &mut Frame<B>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.size());

    f.render_widget(stats_bar(app), chunks[0]);
    f.render_widget(filter_bar(app), chunks[1]);

    let visible = app.visible();
    let items: Vec<ListItem> = visible.iter().map(|todo| todo_line(todo)).collect();
    let title = format!("todos ({}/{})", visible.len(), app.todos.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, chunks[2], &mut state);

    let help = if app.mode == InputMode::Form { FORM_HELP } else { HELP };
    let status = if app.status.is_empty() {
        help.to_string()
    } else {
        format!("{}  |  {help}", app.status)
    };
    f.render_widget(
        Paragraph::new(Spans::from(Span::styled(
            status,
            Style::default().fg(Color::DarkGray),
        ))),
        chunks[3],
    );
}

fn stats_bar(app: &App) -> Paragraph<'static> {
    let stats = app.stats(Local::now().date_naive());
    let line = Spans::from(vec![
        Span::styled(format!("total {}", stats.total), Style::default().fg(Color::Blue)),
        Span::raw("   "),
        Span::styled(
            format!("completed {}", stats.completed),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(
            format!("pending {}", stats.pending),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("   "),
        Span::styled(format!("overdue {}", stats.overdue), Style::default().fg(Color::Red)),
    ]);

    Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title("todo"))
        .alignment(Alignment::Center)
}

fn filter_bar(app: &App) -> Paragraph<'static> {
    if let (InputMode::Form, Some(form)) = (app.mode, app.form.as_ref()) {
        let title = if form.target.is_some() { "edit todo" } else { "new todo" };
        return Paragraph::new(form_line(form))
            .block(Block::default().borders(Borders::ALL).title(title));
    }

    let cursor = if app.mode == InputMode::Search { "_" } else { "" };
    let line = Spans::from(vec![
        Span::raw(format!("search: {}{cursor}", app.filter.search)),
        Span::raw(format!("   status: {}", app.filter.status.label())),
        Span::raw(format!("   priority: {}", app.filter.priority.label())),
    ]);

    Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("filter"))
}

fn form_line(form: &TodoForm) -> Spans<'static> {
    let fields = [
        (FormField::Title, form.title.clone()),
        (FormField::Description, form.description.clone()),
        (FormField::Priority, form.priority.as_str().to_string()),
        (FormField::DueDate, form.due_date.clone()),
    ];

    let mut spans = Vec::new();
    for (field, value) in fields {
        let focused = field == form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let cursor = if focused && field != FormField::Priority { "_" } else { "" };
        spans.push(Span::styled(format!("{}: ", field.label()), label_style));
        spans.push(Span::raw(format!("{value}{cursor}   ")));
    }
    Spans::from(spans)
}

fn todo_line(todo: &Todo) -> ListItem<'static> {
    let check = if todo.completed { "[x] " } else { "[ ] " };
    let title_style = if todo.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let mut spans = vec![
        Span::raw(check),
        Span::styled(
            format!("{:<6} ", todo.priority.as_str()),
            Style::default().fg(priority_color(todo.priority)),
        ),
        Span::styled(todo.title.clone(), title_style),
    ];
    if let Some(due) = todo.due_date {
        spans.push(Span::raw(format!("  due {due}")));
    }
    if let Some(description) = todo.description.as_deref().filter(|text| !text.is_empty()) {
        spans.push(Span::raw(": "));
        spans.push(Span::styled(
            description.to_string(),
            Style::default().fg(Color::LightBlue),
        ));
    }

    ListItem::new(Spans::from(spans))
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}
