use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use advq::{
    RunnerConfig,
    cli::{self, CliError, RunOptions, RunOutcome},
};
use clap::{Parser as ClapParser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "advq")]
#[command(about = "advq - run advanced queries and shape their results")]
#[command(version)]
struct Cli {
    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an advanced query
    Run {
        /// The advanced query (reads from stdin if not provided)
        query: Option<String>,

        /// JSON file with result tuples to use instead of the mock database
        #[arg(short, long)]
        results: Option<PathBuf>,

        /// TOML file with runner settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,

        /// Only validate the document, don't run it
        #[arg(long)]
        syntax_only: bool,
    },

    /// Show how a view or result-transform expression is read
    Compile {
        /// The expression, e.g. '(fn [data] (take 3 data))'
        expression: String,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'advq docs' to list categories)
        category: String,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "advq=debug" } else { "advq=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            query,
            results,
            config,
            compact,
            syntax_only,
        } => run(query, results, config, compact, syntax_only).await,
        Commands::Compile { expression } => cli::execute_compile(&expression).map(|compiled| {
            println!("{}", compiled);
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(
    query: Option<String>,
    results: Option<PathBuf>,
    config: Option<PathBuf>,
    compact: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let query = match query {
        Some(q) => q,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        None => return Err(CliError::NoInput),
    };

    let mut config = match config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    if compact {
        config.pretty = false;
    }

    let results = results.map(fs::read_to_string).transpose()?;

    let options = RunOptions {
        query,
        results,
        config,
        syntax_only,
    };

    match cli::execute_run(&options).await? {
        RunOutcome::SyntaxValid => println!("Syntax is valid"),
        RunOutcome::Success(output) => println!("{}", output),
    }
    Ok(())
}
