/// Wind board daemon.
///
/// Polls the data endpoint on the configured interval, republishes the
/// board after every change, and reads one command per line from stdin:
///
///   tab <avg-wind|gust>     switch display tab (re-renders, then refetches)
///   group <name>            switch station group (re-renders only)
///   window <now|1h|24h|today>
///   refresh | show | groups | quit

use clap::Parser;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread;

use chrono::Utc;

use windboard::config::{self, BoardConfig};
use windboard::logging::{self, Component};
use windboard::model::{BoardError, DataResponse};
use windboard::render::{render_console, render_page};
use windboard::{Controller, DataClient, RefreshOutcome, RefreshTicket, Session, Tab, Window};

/// windboard: live wind speed board for a station data endpoint
#[derive(Parser, Debug)]
#[command(name = "windboard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML config file (WINDBOARD_* environment variables override it)
    config: Option<PathBuf>,
}

enum Event {
    Tick,
    Command(String),
    Fetched(RefreshTicket, Result<DataResponse, BoardError>),
    InputClosed,
}

fn main() {
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("windboard: {}", e);
            std::process::exit(2);
        }
    };

    // validate() has already checked the level string.
    let level = config.min_log_level().unwrap_or(logging::LogLevel::Info);
    logging::init_logger(level, config.log_file.as_deref(), false);
    let source = cli
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    logging::info(Component::Config, Some(&source), &config.summary());

    if let Err(e) = run(config) {
        logging::error(Component::System, None, &e.to_string());
        std::process::exit(1);
    }
}

fn run(config: BoardConfig) -> Result<(), BoardError> {
    let client = DataClient::from_config(&config)?;
    let session = Session::new(config.window, config.tab);
    let mut controller = Controller::new(client, session);

    logging::info(
        Component::System,
        None,
        &format!(
            "polling {} every {}s ({} / {})",
            config.endpoint,
            config.poll_interval_secs,
            config.window.label(),
            config.tab.label()
        ),
    );

    let (tx, rx) = mpsc::channel();
    spawn_ticker(tx.clone(), config.poll_interval());
    spawn_stdin_reader(tx.clone());

    // The ticker fires immediately, which performs the initial fetch.
    for event in rx {
        match event {
            Event::Tick => start_fetch(&mut controller, &tx),
            Event::Fetched(ticket, result) => {
                let outcome = controller.complete_refresh(ticket, result, Utc::now());
                if outcome != RefreshOutcome::Superseded {
                    publish(&controller, config.output_html.as_deref());
                }
            }
            Event::Command(line) => {
                if !handle_command(&mut controller, &tx, &line, config.output_html.as_deref()) {
                    break;
                }
            }
            Event::InputClosed => {
                logging::debug(Component::System, None, "stdin closed; polling continues");
            }
        }
    }

    logging::info(Component::System, None, "shutting down");
    Ok(())
}

/// Returns `false` when the loop should stop.
fn handle_command(
    controller: &mut Controller,
    tx: &Sender<Event>,
    line: &str,
    output: Option<&Path>,
) -> bool {
    let line = line.trim();
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };

    match verb {
        "" => {}
        "quit" | "exit" => return false,
        "refresh" => start_fetch(controller, tx),
        "show" => publish(controller, output),
        "groups" => println!("{}", controller.session().groups().available().join(" | ")),
        "group" => {
            if controller.select_group(arg) {
                publish(controller, output);
            }
        }
        "tab" => {
            controller.select_tab(Tab::from_id(arg));
            publish(controller, output);
            // The backend shapes rows per tab, so follow up with a fetch.
            start_fetch(controller, tx);
        }
        "window" => {
            controller.select_window(Window::from_id(arg));
            start_fetch(controller, tx);
        }
        other => logging::warn(Component::System, Some(other), "unknown command"),
    }
    true
}

fn start_fetch(controller: &mut Controller, tx: &Sender<Event>) {
    let ticket = controller.begin_refresh();
    let client = controller.client().clone();
    let tx = tx.clone();
    logging::debug(Component::Fetch, Some(&ticket.describe()), "requesting");
    thread::spawn(move || {
        let result = client.fetch(ticket.window, ticket.tab);
        let _ = tx.send(Event::Fetched(ticket, result));
    });
}

fn publish(controller: &Controller, output: Option<&Path>) {
    let view = controller.session().view();
    print!("{}", render_console(&view));

    if let Some(path) = output {
        if let Err(e) = write_page(path, &render_page(&view)) {
            logging::error(Component::Render, Some(&path.display().to_string()), &e.to_string());
        }
    }
}

fn write_page(path: &Path, html: &str) -> Result<(), BoardError> {
    // Replace by rename; readers never observe a partial page.
    let tmp = path.with_extension("html.tmp");
    std::fs::write(&tmp, html)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn spawn_ticker(tx: Sender<Event>, interval: std::time::Duration) {
    thread::spawn(move || {
        loop {
            if tx.send(Event::Tick).is_err() {
                break;
            }
            thread::sleep(interval);
        }
    });
}

fn spawn_stdin_reader(tx: Sender<Event>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Event::Command(line)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = tx.send(Event::InputClosed);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_path_is_optional_positional() {
        let cli = Cli::try_parse_from(["windboard", "board.toml"]).expect("path argument");
        assert_eq!(cli.config, Some(PathBuf::from("board.toml")));

        let cli = Cli::try_parse_from(["windboard"]).expect("no arguments");
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_help_flag_is_not_taken_as_config_path() {
        let err = Cli::try_parse_from(["windboard", "--help"]).expect_err("help exits early");
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
