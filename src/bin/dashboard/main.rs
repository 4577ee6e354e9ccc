mod app;
mod client;

use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::{
    format_date, format_price, truncate, AppState, Command, ConnectionStatus, Message, DEFAULT_MONTH,
    PRICE_RANGE_LABELS,
};
use client::ApiClient;

const PER_PAGE: u32 = 10;

/// Dashboard settings, read from the environment.
struct DashboardConfig {
    api_url: String,
    initial_month: String,
    log_path: String,
}

impl DashboardConfig {
    fn from_env() -> Self {
        Self {
            api_url: std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            initial_month: std::env::var("INITIAL_MONTH").unwrap_or_else(|_| DEFAULT_MONTH.to_string()),
            log_path: std::env::var("DASHBOARD_LOG").unwrap_or_else(|_| "dashboard.log".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = DashboardConfig::from_env();
    init_logging(&cfg.log_path);

    let client = ApiClient::new(cfg.api_url.clone()).map_err(io::Error::other)?;
    let mut app = AppState::new(&cfg.initial_month, PER_PAGE);
    let (tx, rx) = mpsc::unbounded_channel();
    info!(api_url = %cfg.api_url, month = app.month(), "dashboard starting");

    for req in app.mount() {
        client.spawn_fetch(req, tx.clone());
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &client, tx, rx).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(path: &str) {
    let file = match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("dashboard logging disabled ({path}): {e}");
            return;
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &ApiClient,
    tx: UnboundedSender<Message>,
    mut rx: UnboundedReceiver<Message>,
) -> io::Result<()> {
    let poll_interval = Duration::from_millis(100);

    loop {
        while let Ok(msg) = rx.try_recv() {
            match msg {
                Message::Fetched(resp) => {
                    app.apply(resp);
                }
                Message::Initialized(res) => {
                    for req in app.apply_initialized(res) {
                        client.spawn_fetch(req, tx.clone());
                    }
                }
            }
        }

        terminal.draw(|f| render(f, app))?;

        // crossterm polling blocks; keep it off the async workers.
        let key = tokio::task::block_in_place(|| -> io::Result<Option<Event>> {
            if event::poll(poll_interval)? {
                Ok(Some(event::read()?))
            } else {
                Ok(None)
            }
        })?;

        let Some(Event::Key(key)) = key else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.handle_key(key) {
            Command::Quit => return Ok(()),
            Command::Fetch(reqs) => {
                for req in reqs {
                    client.spawn_fetch(req, tx.clone());
                }
            }
            Command::Initialize => {
                warn!("re-seeding store from dashboard");
                app.notice = Some("initializing…".to_string());
                client.spawn_initialize(tx.clone());
            }
            Command::None => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState) {
    let area = f.area();

    // Outer vertical split: header | charts | table | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // header
            Constraint::Length(14), // charts
            Constraint::Min(6),     // table
            Constraint::Length(1),  // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_charts(f, app, chunks[1]);
    render_transactions_table(f, app, chunks[2]);
    render_footer(f, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let mut spans = vec![
        Span::styled(
            " Transactions Dashboard  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  month: "),
        Span::styled(app.month(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw("  │  search: "),
        Span::styled(format!("{}▏", app.search), Style::default().fg(Color::White)),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(truncate(notice, 48), Style::default().fg(Color::DarkGray)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));

    f.render_widget(paragraph, area);
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn render_charts(f: &mut Frame, app: &AppState, area: Rect) {
    // statistics (22%) | bar chart (48%) | categories (30%)
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(22),
            Constraint::Percentage(48),
            Constraint::Percentage(30),
        ])
        .split(area);

    render_statistics(f, app, cols[0]);
    render_bar_chart(f, app, cols[1]);
    render_pie_chart(f, app, cols[2]);
}

fn render_statistics(f: &mut Frame, app: &AppState, area: Rect) {
    let stats = &app.statistics;
    let lines = vec![
        Line::from(vec![
            Span::raw("Total sale      "),
            Span::styled(format_price(stats.total_sales), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::raw("Sold items      "),
            Span::styled(stats.total_sold_items.to_string(), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("Not sold items  "),
            Span::styled(stats.total_not_sold_items.to_string(), Style::default().fg(Color::White)),
        ]),
    ];
    let title = format!(" STATISTICS · {} ", app.month().to_uppercase());
    f.render_widget(Paragraph::new(lines).block(titled_block(&title)), area);
}

fn render_bar_chart(f: &mut Frame, app: &AppState, area: Rect) {
    let bars: Vec<Bar> = PRICE_RANGE_LABELS
        .iter()
        .zip(app.bar_chart.iter())
        .map(|(label, &count)| {
            Bar::default()
                .value(count.max(0) as u64)
                .label(Line::from(*label))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    let chart = BarChart::default()
        .block(titled_block(" PRICE RANGES "))
        .bar_width(7)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn render_pie_chart(f: &mut Frame, app: &AppState, area: Rect) {
    let total: i64 = app.pie_chart.iter().map(|c| c.count).sum();
    let rows: Vec<Row> = app
        .pie_chart
        .iter()
        .map(|c| {
            let share = if total > 0 { c.count as f64 / total as f64 } else { 0.0 };
            let bar = "█".repeat((share * 10.0).round() as usize);
            Row::new(vec![
                Cell::from(truncate(&c.category, 18)),
                Cell::from(c.count.to_string()).style(Style::default().fg(Color::Cyan)),
                Cell::from(format!("{:>3.0}% {bar}", share * 100.0)).style(Style::default().fg(Color::Magenta)),
            ])
        })
        .collect();

    let header = Row::new(["Category", "Items", "Share"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }));

    let table = Table::new(
        rows,
        [Constraint::Min(10), Constraint::Length(5), Constraint::Length(15)],
    )
    .header(header)
    .block(titled_block(" CATEGORIES "));

    f.render_widget(table, area);
}

fn render_transactions_table(f: &mut Frame, app: &AppState, area: Rect) {
    let header_cells = ["ID", "Title", "Description", "Price", "Category", "Sold", "Date"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .transactions
        .iter()
        .map(|t| {
            let (sold, sold_color) = if t.sold {
                ("yes", Color::Green)
            } else {
                ("no", Color::DarkGray)
            };
            Row::new(vec![
                Cell::from(t.store_id.to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&t.title, 30)),
                Cell::from(truncate(&t.description, 40)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(format_price(t.price)).style(Style::default().fg(Color::Cyan)),
                Cell::from(truncate(&t.category, 16)),
                Cell::from(sold).style(Style::default().fg(sold_color)),
                Cell::from(format_date(&t.date_of_sale)),
            ])
        })
        .collect();

    let title = format!(" TRANSACTIONS · page {} ", app.page);
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(30),
            Constraint::Min(10),
            Constraint::Length(9),
            Constraint::Length(16),
            Constraint::Length(4),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(titled_block(&title));

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [esc] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[← →] ", Style::default().fg(Color::Yellow)),
        Span::raw("month  "),
        Span::styled("[type] ", Style::default().fg(Color::Yellow)),
        Span::raw("search  "),
        Span::styled("[PgUp PgDn] ", Style::default().fg(Color::Yellow)),
        Span::raw("page  "),
        Span::styled("[F5] ", Style::default().fg(Color::Yellow)),
        Span::raw("refresh  "),
        Span::styled("[F2] ", Style::default().fg(Color::Yellow)),
        Span::raw("initialize"),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
