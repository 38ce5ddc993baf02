use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

mod controller;
mod debounce;
mod domain;
mod editor;
mod elements;
mod inputter;
mod model;
mod ui;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use controller::Controller;
use domain::{PTConfig, PTError};
use model::{Model, Status};
use ui::TableUI;

/// A tui based periodic table editor.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Quiet period in milliseconds before a typed filter is applied
    #[arg(long, default_value_t = 500)]
    debounce_ms: u64,

    /// Terminal event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Write tracing output to this file (stdout belongs to the TUI)
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn init_logging(path: Option<&PathBuf>) -> Result<(), PTError> {
    let Some(path) = path else { return Ok(()) };
    let logfile = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(logfile))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| PTError::LoggingSetup(e.to_string()))
}

fn run() -> Result<(), PTError> {
    let cli = Cli::parse();
    init_logging(cli.log.as_ref())?;
    info!("Starting pte!");

    let cfg = PTConfig::default()
        .with_event_poll_time(cli.poll_ms)
        .with_debounce_ms(cli.debounce_ms);

    let mut model = Model::init(&cfg, elements::seed_elements())?;
    let controller = Controller::new(&cfg);
    let mut ui = TableUI::new(&cfg);

    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events, map them to a Message and let the model react.
        // A poll timeout yields None, which still ticks the debounce.
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    Ok(())
}
