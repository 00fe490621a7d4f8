//! pdfgrid - PDF Data Editor
//!
//! A terminal application for reviewing data extracted from PDF documents.
//! The PDF is shown beside an editable table of the extracted rows, which
//! can be corrected, mapped from PDF text and exported as JSON or CSV.

use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pdfgrid::application::{App, AppMode, TaskRunner};
use pdfgrid::domain::{Dataset, EditorError};
use pdfgrid::infrastructure::{
    EditorConfig, FileRepository, PdfApiClient, PdfDocument, DEFAULT_API_URL, DEFAULT_SUGGEST_PATH,
    DEFAULT_TIMEOUT_SECS,
};
use pdfgrid::presentation::{render_ui, sync_viewport, InputHandler};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const TICK_RATE: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the extraction service
    #[arg(long, env = "PDFGRID_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "PDFGRID_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,

    /// Path of the mapping suggestion endpoint
    #[arg(long, env = "PDFGRID_SUGGEST_PATH", default_value = DEFAULT_SUGGEST_PATH, global = true)]
    suggest_path: String,

    /// PDF document to open on start
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// JSON or CSV row file to open on start
    #[arg(long)]
    rows: Option<PathBuf>,

    /// Write log output to this file while the interface is running
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a row file between JSON and CSV, by extension
    Convert { input: PathBuf, output: PathBuf },
    /// Send a PDF to the extraction service and write the rows
    Process {
        pdf: PathBuf,
        /// Output file (.json or .csv); prints JSON to stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report whether the extraction service is reachable
    Health,
}

/// Entry point for the pdfgrid editor.
///
/// Without a subcommand the terminal interface starts; otherwise the
/// requested headless command runs and exits.
///
/// # Errors
///
/// Returns an error if terminal setup fails, or if a headless command fails.
fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = EditorConfig::new(&cli.api_url, &cli.suggest_path, cli.timeout_secs);

    match &cli.command {
        None => run_tui(&cli, PdfApiClient::new(config)?),
        Some(command) => {
            pretty_env_logger::init();
            run_command(command, config)
        }
    }
}

/// Runs a headless command; only the service commands build an HTTP client.
fn run_command(command: &Command, config: EditorConfig) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Convert { input, output } => {
            let dataset = FileRepository::load_rows(input, &[])?;
            write_rows(&dataset, output)?;
            println!("{} rows written to {}", dataset.rows.len(), output.display());
        }
        Command::Process { pdf, output } => {
            let client = PdfApiClient::new(config)?;
            let outcome = client.process_pdf(pdf)?;
            let dataset = Dataset::from_json_values(outcome.rows, &[])?;
            if let Some(secs) = outcome.processing_time {
                log::info!("processed {} in {:.2}s", pdf.display(), secs);
            }
            match output {
                Some(path) => {
                    write_rows(&dataset, path)?;
                    println!("{} rows written to {}", dataset.rows.len(), path.display());
                }
                None => println!("{}", pdfgrid::domain::CsvExporter::to_json(&dataset.rows)?),
            }
        }
        Command::Health => {
            let client = PdfApiClient::new(config)?;
            let report = client.health()?;
            println!(
                "{}: status {}, version {}, mode {}",
                client.config().api_url,
                report.status,
                report.version.as_deref().unwrap_or("unknown"),
                report.mode.as_deref().unwrap_or("unknown")
            );
        }
    }
    Ok(())
}

fn write_rows(dataset: &Dataset, path: &Path) -> Result<String, EditorError> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        FileRepository::save_csv(&dataset.rows, &dataset.columns, path)
    } else {
        FileRepository::save_json(&dataset.rows, path)
    }
}

/// Sends log output to a file so it never lands on the terminal screen.
fn init_file_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_tui(cli: &Cli, client: PdfApiClient) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &cli.log_file {
        init_file_logging(path)?;
    }

    let mut app = App::with_tasks(TaskRunner::new(client));
    if let Some(path) = &cli.rows {
        let result = FileRepository::load_rows(path, &app.dataset.columns);
        app.set_rows_load_result(result, path.display().to_string());
    }
    if let Some(path) = &cli.pdf {
        app.set_pdf_load_result(PdfDocument::open(path));
    }
    app.check_service();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    app.set_screen_size(size.width, size.height);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Redraws at least every [`TICK_RATE`] so background results and
/// notification expiry show up without input.
///
/// # Arguments
///
/// * `terminal` - Terminal interface for rendering
/// * `app` - Mutable reference to application state
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        sync_viewport(app);
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(TICK_RATE)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') if app.mode == AppMode::Normal => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                },
                Event::Mouse(mouse) => InputHandler::handle_mouse_event(app, mouse),
                Event::Resize(width, height) => app.set_screen_size(width, height),
                _ => {}
            }
        }

        app.tick(Instant::now());
    }
}
