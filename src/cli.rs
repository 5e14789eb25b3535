use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::entry::Category;

#[derive(Debug, Parser)]
#[command(
    name = "sitefind",
    about = "Fuzzy search over a catalog of site content"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Load the catalog from this JSON file instead of the default
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Relevance-ranked search across the catalog
    Search(SearchArgs),
    /// Fast substring suggestions ordered by priority
    Suggest(SuggestArgs),
    /// List the categories present in the catalog
    Categories(CategoriesArgs),
    /// Interactive session reading queries from stdin
    Session,
    /// Start MCP server for AI agent integration
    Mcp,
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Number of results to return [default: from settings, 10]
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Search only within this category (e.g. Docs, FAQs)
    #[arg(short = 'c', long)]
    pub category: Option<Category>,

    /// Minimum score threshold [default: from settings, 10]
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Suggest --

#[derive(Debug, Parser)]
pub struct SuggestArgs {
    /// The partial query
    pub query: String,

    /// Number of suggestions to return [default: from settings, 5]
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Output suggestions as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Categories --

#[derive(Debug, Parser)]
pub struct CategoriesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "sitefind",
            &mut std::io::stdout(),
        );
    }
}
