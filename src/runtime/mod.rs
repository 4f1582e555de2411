//! Terminal front end: settings and logging bootstrap, then a single-thread
//! loop that feeds keys and backend outcomes to the navigator.

use std::env;
use std::path::PathBuf;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::style::Print;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init(&settings.log)?;
    log::info!("encore starting up");

    let args: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    let mut session = startup::open_session(&settings, &args)?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, Hide)?;

    let run_result = event_loop::run(&mut stdout, &settings, &mut session);

    disable_raw_mode()?;
    execute!(stdout, Show, Print("\r\n"))?;

    run_result
}
