use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;
use tracing::trace;
use tracing::warn;
use tracing::Level;

mod assets;
mod board;
mod config;
mod format;
mod render;

use crate::assets::req_consumer::{consume_page_requests, ApiSettings};
use crate::assets::request::{PageRequest, PageResponse};
use crate::board::{Board, Effect, Event};
use crate::config::{read_config, Config};
use crate::render::{render_html, render_text, table_rows};

const HELP: &str = "commands: more | m | <enter>  load the next page
          search <text> | /<text>  open the detail view for <text>
          html <path>             write the table as HTML
          show                    print the table again
          quit | q                exit";

#[derive(Debug, Parser)]
#[command(name = "coincap-board", version, about = "Paginated CoinCap market table")]
struct Cli {
    /// JSON config file; built-in defaults are used when omitted
    #[arg(long, env = "COINCAP_BOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log at DEBUG instead of INFO
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    LoadMore,
    Search(String),
    Html(PathBuf),
    Show,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(text) = line.strip_prefix('/') {
        return Command::Search(text.to_string());
    }

    // Only the first space separates the command, the rest is kept raw.
    let (word, rest) = match line.split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (line, ""),
    };

    match word {
        "" | "m" | "more" => Command::LoadMore,
        "search" => Command::Search(rest.to_string()),
        "html" if !rest.trim().is_empty() => Command::Html(PathBuf::from(rest.trim())),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

struct Shell {
    board: Board,
    icon_base_url: String,
    job_sender: mpsc::UnboundedSender<PageRequest>,
    resp_sender: mpsc::UnboundedSender<PageResponse>,
}

impl Shell {
    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Fetch { generation, offset } => {
                    trace!("Requesting page at offset {} (generation {})", offset, generation);
                    let req = PageRequest {
                        generation,
                        offset,
                        resp_sender: self.resp_sender.clone(),
                    };
                    if let Err(e) = self.job_sender.send(req) {
                        error!("cannot send page request to channel for offset {}: {}", offset, e);
                    }
                }
                Effect::Navigate(route) => {
                    info!("Navigating to {}", route);
                    println!("-> {}", route);
                }
                Effect::Render => self.print_table(),
            }
        }
    }

    fn print_table(&self) {
        let rows = table_rows(self.board.assets(), &self.icon_base_url);
        print!("{}", render_text(&rows, self.board.banner()));
        debug!(
            "Rendered {} rows, cursor {}, state {:?}",
            rows.len(),
            self.board.cursor(),
            self.board.state()
        );
    }

    async fn write_html(&self, path: &Path) {
        let rows = table_rows(self.board.assets(), &self.icon_base_url);
        match fs::write(path, render_html(&rows)).await {
            Ok(_) => info!("Wrote {} rows to {}", rows.len(), path.display()),
            Err(e) => error!("Error writing HTML table to {}: {}", path.display(), e),
        }
    }

    /// Returns `false` once the user asked to quit.
    async fn handle_line(&mut self, line: &str) -> bool {
        match parse_command(line) {
            Command::LoadMore => {
                let effects = self.board.handle(Event::LoadMore);
                self.run_effects(effects);
            }
            Command::Search(text) => {
                self.board.handle(Event::InputChanged(text));
                let effects = self.board.handle(Event::SubmitSearch);
                if effects.is_empty() {
                    debug!("Empty search input, nothing to do");
                }
                self.run_effects(effects);
            }
            Command::Html(path) => self.write_html(&path).await,
            Command::Show => self.print_table(),
            Command::Help => println!("{}", HELP),
            Command::Quit => return false,
            Command::Unknown(text) => {
                warn!("Unknown command: {}", text);
                println!("{}", HELP);
            }
        }
        true
    }
}

#[instrument(skip_all)]
async fn run_board(config: Config) {
    let (job_sender, job_receiver) = mpsc::unbounded_channel();
    let (resp_sender, mut resp_receiver) = mpsc::unbounded_channel();

    let api_settings = ApiSettings {
        base_url: config.api_base_url.clone(),
        api_key: config.api_key.clone(),
        timeout: Duration::from_secs(config.request_timeout_secs),
    };
    trace!("Starting page request consumer...");
    tokio::spawn(async move {
        consume_page_requests(job_receiver, api_settings).await;
    });

    let mut shell = Shell {
        board: Board::new(config.dedupe_by_id),
        icon_base_url: config.icon_base_url.clone(),
        job_sender,
        resp_sender,
    };

    let effects = shell.board.mount();
    shell.run_effects(effects);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !shell.handle_line(&line).await {
                        info!("Quit requested, stopping...");
                        break;
                    }
                }
                Ok(None) => {
                    info!("Input closed, stopping...");
                    break;
                }
                Err(e) => {
                    error!("Error reading input: {}", e);
                    break;
                }
            },
            Some(response) = resp_receiver.recv() => {
                let effects = shell.board.handle(Event::PageLoaded(response));
                shell.run_effects(effects);
            }
            _ = &mut ctrl_c => {
                info!("Ctrl+C pressed. Stopping...");
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => match read_config(path).await {
            Ok(config) => config,
            Err(error) => {
                error!("Error reading config file {}: {}", path.display(), error);
                return;
            }
        },
        None => Config::default(),
    };

    info!(
        "Listing assets from {} (dedupe by id: {})",
        config.api_base_url, config.dedupe_by_id
    );

    run_board(config).await;

    info!("Board closed.");
}
