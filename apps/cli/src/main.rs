use std::future::Future;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    connect, load_settings, BrowserSession, ClientConfig, FetchResult, QueryError,
    QueryStateController,
};
use shared::domain::SearchState;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod render;
mod repl;

use render::{render_loading, render_preview, render_result};
use repl::{parse_command, ReplCommand, HELP};

#[derive(Parser, Debug)]
#[command(name = "pixelscape", about = "Search and browse photos from the image service")]
struct Cli {
    /// Override the configured image service base URL.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    per_page: Option<u32>,
    /// Print the raw result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search by free text.
    Search {
        text: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Browse a category.
    Category {
        value: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Interactive search loop reading commands from stdin.
    Browse,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    let config = settings
        .validate()
        .context("image service is not configured")?;
    info!(base_url = %config.base_url, "using image service");

    match cli.command {
        Command::Search { text, page } => {
            let controller = plan_query(config.initial_state.clone(), Scope::Text(&text), &page)?;
            run_once(config, controller, page.json).await
        }
        Command::Category { value, page } => {
            let controller =
                plan_query(config.initial_state.clone(), Scope::Category(&value), &page)?;
            run_once(config, controller, page.json).await
        }
        Command::Browse => browse(&connect(config)).await,
    }
}

enum Scope<'a> {
    Text(&'a str),
    Category(&'a str),
}

/// Settles the whole query up front so a one-shot run issues a single request.
fn plan_query(
    initial: SearchState,
    scope: Scope<'_>,
    args: &PageArgs,
) -> Result<QueryStateController> {
    let mut controller = QueryStateController::new(initial);
    match scope {
        Scope::Text(text) => {
            if text.trim().is_empty() {
                anyhow::bail!("search text is empty");
            }
            controller.submit_search(text);
        }
        Scope::Category(value) => {
            if value.trim().is_empty() {
                anyhow::bail!("category is empty");
            }
            controller.select_category(value);
        }
    }
    if let Some(per_page) = args.per_page {
        controller.set_page_size(per_page)?;
    }
    controller.set_page(args.page)?;
    Ok(controller)
}

async fn run_once(
    mut config: ClientConfig,
    controller: QueryStateController,
    json: bool,
) -> Result<()> {
    config.initial_state = controller.state().clone();

    let session = connect(config);
    let result = session.refresh().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&session, &result).await;
    }

    if let FetchResult::Failure(failure) = result {
        anyhow::bail!("search failed: {}", failure.message);
    }
    Ok(())
}

async fn browse(session: &BrowserSession) -> Result<()> {
    println!("{HELP}");
    let mut events = session.subscribe();
    let result = with_loading_notices(session, &mut events, session.refresh()).await;
    print_result(session, &result).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        debug!(?command, "browse command");

        match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::State => {
                let state = session.state().await;
                println!(
                    "query=\"{}\" category=\"{}\" page={} per_page={}",
                    state.free_text_query,
                    state.selected_category,
                    state.page,
                    state.page_size.get()
                );
            }
            ReplCommand::Show(id) => show_image(session, id).await,
            command => {
                match with_loading_notices(session, &mut events, apply(session, command)).await {
                    Ok(result) => print_result(session, &result).await,
                    Err(err) => println!("{err}"),
                }
            }
        }
    }

    Ok(())
}

async fn apply(
    session: &BrowserSession,
    command: ReplCommand,
) -> Result<FetchResult, QueryError> {
    match command {
        ReplCommand::Search(text) => Ok(session.submit_search(&text).await),
        ReplCommand::Category(value) => Ok(session.select_category(&value).await),
        ReplCommand::Page(page) => session.set_page(page).await,
        ReplCommand::Next => session.next_page().await,
        ReplCommand::Prev => session.previous_page().await,
        ReplCommand::Size(size) => session.set_page_size(size).await,
        ReplCommand::Refresh => Ok(session.refresh().await),
        ReplCommand::Quit | ReplCommand::Help | ReplCommand::State | ReplCommand::Show(_) => {
            Ok(session.snapshot().await)
        }
    }
}

/// Drives `work` and prints a loading line for every request it starts,
/// along with the page still on screen.
async fn with_loading_notices<T>(
    session: &BrowserSession,
    events: &mut broadcast::Receiver<FetchResult>,
    work: impl Future<Output = T>,
) -> T {
    tokio::pin!(work);
    let mut listening = true;
    loop {
        tokio::select! {
            biased;
            event = events.recv(), if listening => match event {
                Ok(FetchResult::Pending { requested }) => {
                    let retained = session.retained().await;
                    println!("{}", render_loading(&requested, retained.as_ref()));
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => listening = false,
            },
            output = &mut work => return output,
        }
    }
}

async fn show_image(session: &BrowserSession, id: u64) {
    match session.snapshot().await {
        FetchResult::Success { items, .. } => {
            match items.iter().find(|item| item.id.0 == id) {
                Some(item) => println!("{}", render_preview(item)),
                None => println!("no image #{id} on this page"),
            }
        }
        _ => println!("no results loaded"),
    }
}

async fn print_result(session: &BrowserSession, result: &FetchResult) {
    let state = session.state().await;
    let total_pages = session.total_pages().await;
    println!("{}", render_result(result, &state, total_pages));
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::PageSize;

    fn args(page: u32, per_page: Option<u32>) -> PageArgs {
        PageArgs {
            page,
            per_page,
            json: false,
        }
    }

    fn seed() -> SearchState {
        SearchState::new("nature", PageSize::Twenty)
    }

    #[test]
    fn blank_search_text_is_rejected_before_any_request() {
        let err = plan_query(seed(), Scope::Text("   "), &args(1, None))
            .err()
            .expect("blank text must fail");
        assert_eq!(err.to_string(), "search text is empty");
        assert!(plan_query(seed(), Scope::Category(""), &args(1, None)).is_err());
    }

    #[test]
    fn search_args_settle_into_one_state() {
        let controller =
            plan_query(seed(), Scope::Text(" harbor "), &args(3, Some(40))).expect("plan");
        let state = controller.state();
        assert_eq!(state.effective_query(), "harbor");
        assert_eq!(state.page, 3);
        assert_eq!(state.page_size, PageSize::Forty);
    }

    #[test]
    fn category_wins_over_seed_query() {
        let controller =
            plan_query(seed(), Scope::Category("animals"), &args(1, None)).expect("plan");
        assert_eq!(controller.state().effective_query(), "animals");
    }

    #[test]
    fn invalid_page_args_are_errors() {
        assert!(plan_query(seed(), Scope::Text("cats"), &args(0, None)).is_err());
        assert!(plan_query(seed(), Scope::Text("cats"), &args(1, Some(25))).is_err());
    }
}
