use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, prelude::*};

mod controller;
mod directory;
mod domain;
mod model;
mod pagination;
mod search;
mod sort;
mod transport;
mod ui;

use controller::Controller;
use directory::{Directory, DirectoryTransport};
use domain::{Message, PageProps, TVConfig, TVError};
use model::{Model, Status};
use ui::TableUI;

/// Browse an employee directory page by page.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV file with the columns emp_no, first_name, last_name, gender
    data: String,

    /// Initial search text
    #[arg(short, long, default_value = "")]
    search: String,

    /// Employees per page
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u16).range(1..))]
    page_size: u16,

    /// How long to wait for key events in each frame, in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Where to write the log, the terminal belongs to the table
    #[arg(long, default_value = "emptv.log")]
    log_file: String,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> Result<TVConfig, TVError> {
        Ok(TVConfig {
            data_path: expand_path(&self.data)?,
            initial_search: self.search.clone(),
            page_size: self.page_size as usize,
            event_poll_time: self.poll_ms,
        })
    }
}

fn expand_path(path: &str) -> Result<PathBuf, TVError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.into_owned()))
        .map_err(|e| TVError::LoadingFailed(e.to_string()))
}

fn init_logging(args: &Args) -> Result<(), TVError> {
    let file = File::create(expand_path(&args.log_file)?)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let result = run(&args);
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: &Args) -> Result<(), TVError> {
    init_logging(args)?;
    let cfg = args.config()?;
    info!("Starting emptv with {:?}", cfg);

    let directory = Directory::load(cfg.data_path.clone(), cfg.page_size)?;
    let transport = DirectoryTransport::spawn(directory);

    // Nothing is loaded yet, the first refresh fetches page 1
    let mut model = Model::mount(PageProps::empty(cfg.initial_search.clone()), transport);
    model.update(Some(Message::Refresh));

    let controller = Controller::new(&cfg);
    let mut ui = TableUI::new();
    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        model.sync();

        // Render the current view
        let uidata = model.uidata();
        terminal.draw(|f| ui.draw(&uidata, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(model.raw_keyevents())?;
        model.update(message);
    }

    info!(
        "Quitting emptv on {} sorted by {:?}, search \"{}\", last request {:?}",
        model.pagination().label(),
        model.sort(),
        model.search_text(),
        model.request_state()
    );
    Ok(())
}
