use std::sync::Arc;

use clap::Parser;
use sitefind::{
    Catalog,
    DataDir,
    QuerySession,
    SearchOptions,
    SearchService,
    SessionOptions,
    Settings,
    cli::{self, Cli, Command},
    error,
    mcp,
    search::{self, ResultItem},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("SITEFIND_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    debug!(path = %data_dir.root().display(), "using data directory");
    let settings = Settings::load(&data_dir.settings())?;
    let catalog = match data_dir.catalog_source(cli.catalog.as_deref()) {
        Some(path) => Catalog::from_path(&path)?,
        None => {
            debug!("no catalog file configured, using built-in catalog");
            Catalog::builtin()?
        }
    };
    let service = SearchService::new(catalog);

    match cli.command {
        Command::Search(args) => cmd_search(&service, &settings, &args)?,
        Command::Suggest(args) => cmd_suggest(&service, &settings, &args)?,
        Command::Categories(args) => cmd_categories(&service, args.json)?,
        Command::Session => cmd_session(service, &settings)?,
        Command::Mcp => mcp::run_mcp(service, settings)?,
        Command::Completions(_) => {}
    }

    Ok(())
}

fn cmd_search(
    service: &SearchService,
    settings: &Settings,
    args: &cli::SearchArgs,
) -> error::Result<()> {
    let defaults = settings.search_options();
    let options = SearchOptions {
        max_results: args.count.unwrap_or(defaults.max_results),
        min_score: args.min_score.unwrap_or(defaults.min_score),
        category: args.category,
    };

    let items: Vec<ResultItem> = service
        .rank(&args.query, &options)
        .iter()
        .map(ResultItem::from)
        .collect();

    if args.json {
        println!("{}", search::format_json(&args.query, items)?);
    } else {
        println!("{}", search::format_human(&items));
    }
    Ok(())
}

fn cmd_suggest(
    service: &SearchService,
    settings: &Settings,
    args: &cli::SuggestArgs,
) -> error::Result<()> {
    let limit = args.count.unwrap_or(settings.suggestion_limit);
    let items: Vec<ResultItem> = service
        .suggestions(&args.query, limit)
        .iter()
        .map(ResultItem::from)
        .collect();

    if args.json {
        println!("{}", search::format_json(&args.query, items)?);
    } else {
        println!("{}", search::format_human(&items));
    }
    Ok(())
}

fn cmd_categories(service: &SearchService, json: bool) -> error::Result<()> {
    let categories = service.categories();

    if json {
        println!("{}", serde_json::to_string(&categories)?);
    } else if categories.is_empty() {
        println!("No categories in catalog.");
    } else {
        for category in &categories {
            let count = service.catalog().entries(Some(*category)).count();
            println!("{category}\t{count}");
        }
    }
    Ok(())
}

/// A line-oriented front end for a [`QuerySession`].
///
/// Plain lines replace the query; lines starting with `:` are commands.
fn cmd_session(service: SearchService, settings: &Settings) -> error::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            error::Error::Runtime(format!("failed to start tokio runtime: {e}"))
        })?;

    runtime.block_on(async move {
        let mut session = QuerySession::new(
            Arc::new(service),
            SessionOptions::from(settings),
        )?;
        let mut updates = session.updates();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        eprintln!(
            "Type to search. Commands: :go, :cat [NAME], :categories, :clear, :quit"
        );

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if !handle_line(&mut session, &line) {
                        break;
                    }
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    updates.borrow_and_update();
                    print_session(&session);
                }
            }
        }

        // Let a debounced lookup for the last line finish before exiting.
        if session.is_searching() {
            session.search_now();
            print_session(&session);
        }

        info!("session closed");
        Ok::<(), error::Error>(())
    })
}

/// Apply one input line to the session. Returns false to stop.
fn handle_line(session: &mut QuerySession, line: &str) -> bool {
    let Some(command) = line.strip_prefix(':') else {
        session.set_query(line);
        return true;
    };

    let mut parts = command.splitn(2, ' ');
    match (parts.next().unwrap_or_default(), parts.next().map(str::trim)) {
        ("quit" | "q", _) => return false,
        ("go", _) => session.search_now(),
        ("clear", _) => session.clear(),
        ("cat", None) | ("cat", Some("")) => session.set_category(None),
        ("cat", Some(name)) => match name.parse() {
            Ok(category) => session.set_category(Some(category)),
            Err(e) => eprintln!("{e}"),
        },
        ("categories", _) => {
            let names: Vec<String> = session
                .available_categories()
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("{}", names.join(", "));
        }
        (other, _) => eprintln!("unknown command: :{other}"),
    }
    true
}

fn print_session(session: &QuerySession) {
    let query = session.query();
    if query.trim().is_empty() {
        return;
    }

    let suggestions: Vec<String> = session
        .current_suggestions()
        .iter()
        .map(|e| e.title.clone())
        .collect();
    let results: Vec<ResultItem> = session
        .current_results()
        .iter()
        .map(ResultItem::from)
        .collect();

    match session.category() {
        Some(category) => println!("== {query} [{category}]"),
        None => println!("== {query}"),
    }
    if !suggestions.is_empty() {
        println!("Suggestions: {}", suggestions.join(" | "));
    }
    println!("{}", search::format_human(&results));
}
