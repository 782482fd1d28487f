use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, SearchClient, Settings};
use search_console::{
    console::{ConsoleCommand, HELP},
    render::render_view,
    start_controller, SearchController,
};
use shared::domain::{BookId, SortMode};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "search_console", about = "Interactive client for the book search API")]
struct Args {
    /// Settings file (defaults to ./search_console.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    search_limit: Option<u32>,
    #[arg(long)]
    suggestion_limit: Option<u32>,
    #[arg(long)]
    sort: Option<SortMode>,
    /// Book id whose suggestions are shown before any search ("0" = popular).
    #[arg(long)]
    default_anchor: Option<String>,
    /// How long to wait for in-flight requests before printing the view anyway.
    #[arg(long, default_value_t = 30)]
    wait_secs: u64,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.api_base_url {
            settings.api_base_url = v.clone();
        }
        if let Some(v) = self.search_limit {
            settings.search_limit = v;
        }
        if let Some(v) = self.suggestion_limit {
            settings.suggestion_limit = v;
        }
        if let Some(v) = self.sort {
            settings.default_sort = v;
        }
        if let Some(v) = &self.default_anchor {
            settings.default_anchor = Some(BookId::new(v.trim()));
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    args.apply(&mut settings);
    let settings = settings.normalized();

    let client = SearchClient::from_settings(&settings).context("failed to build search client")?;
    let mut controller =
        start_controller(&settings, client).context("failed to start backend worker")?;
    let wait = Duration::from_secs(args.wait_secs);

    println!("Book search console ({})", settings.api_base_url);
    println!("{HELP}");
    if controller.open().is_some() {
        settle_and_render(&mut controller, wait);
    }

    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match ConsoleCommand::parse(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(ConsoleCommand::Help)) => println!("{HELP}"),
            Ok(Some(command)) => {
                run_command(&mut controller, command);
                settle_and_render(&mut controller, wait);
            }
            Err(message) => println!("{message}"),
        }
        prompt()?;
    }

    Ok(())
}

fn run_command(controller: &mut SearchController, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Search(text) => {
            controller.submit_query(&text);
        }
        ConsoleCommand::Pattern(pattern) => {
            controller.submit_pattern(&pattern);
        }
        ConsoleCommand::Sort(sort_mode) => {
            controller.change_sort_mode(sort_mode);
        }
        ConsoleCommand::Book(book_id) => {
            controller.view_book(book_id);
        }
        ConsoleCommand::Refresh => {
            if controller.refresh_suggestions().is_none() {
                println!("No anchor yet; search or open a book first.");
            }
        }
        ConsoleCommand::Show | ConsoleCommand::Help | ConsoleCommand::Quit => {}
    }
}

fn settle_and_render(controller: &mut SearchController, wait: Duration) {
    if !controller.wait_until_idle(wait) {
        println!("(some requests are still in flight)");
    }
    println!("{}", render_view(controller.state()));
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush().context("failed to flush stdout")
}
