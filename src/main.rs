use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shelf::classifier::GenreClassifierBuilder;
use shelf::remote::{CatalogClientBuilder, ClassifierClientBuilder};
use shelf::scanner::{report_outcome, run_interactive};
use shelf::shutdown::install_interrupt_handler;
use shelf::utils::{COLLECTION_FILE, GENRES_FILE, ensure_parent_directory, get_data_dir};
use shelf::{Isbn, Scanner, Taxonomy};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// shelf - scan ISBNs into a genre-sorted book collection
#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Scan ISBNs into a genre-classified, author-sorted book collection")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    storage: StorageArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Storage and network options shared by all commands
#[derive(Args)]
struct StorageArgs {
    /// Collection report file [default: <data dir>/shelf/book_collection.txt]
    #[arg(long, global = true, value_name = "PATH")]
    collection: Option<PathBuf>,

    /// Genre list file [default: <data dir>/shelf/genres.txt]
    #[arg(long, global = true, value_name = "PATH")]
    genres: Option<PathBuf>,

    /// How many times to retry transient network failures
    #[arg(long, global = true, default_value_t = 0, value_name = "N")]
    retries: usize,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Scan ISBNs interactively (default)
    Scan,
    /// Look up, classify and add the given ISBNs
    Add(AddCommand),
    /// List known genres
    Genres,
}

/// Add books by ISBN
#[derive(Parser)]
struct AddCommand {
    /// One or more ISBN-10 or ISBN-13 values
    #[arg(value_name = "ISBN", required = true)]
    isbns: Vec<String>,
}

fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let result = match &cli.command {
        None | Some(Commands::Scan) => handle_scan(&cli.storage),
        Some(Commands::Add(cmd)) => handle_add(&cli.storage, cmd),
        Some(Commands::Genres) => handle_genres(&cli.storage),
    };

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Installs the stderr log subscriber, honouring `RUST_LOG`.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "shelf=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Determines if an error is a user error (vs internal error).
fn is_user_error(error: &anyhow::Error) -> bool {
    error.to_string().contains("No valid ISBN")
}

/// Resolves the collection and genre file paths, creating their directories.
fn resolve_paths(storage: &StorageArgs) -> Result<(PathBuf, PathBuf)> {
    let collection = match &storage.collection {
        Some(path) => path.clone(),
        None => get_data_dir()?.join(COLLECTION_FILE),
    };
    let genres = match &storage.genres {
        Some(path) => path.clone(),
        None => get_data_dir()?.join(GENRES_FILE),
    };

    ensure_parent_directory(&collection)?;
    ensure_parent_directory(&genres)?;
    Ok((collection, genres))
}

/// Builds a scanner wired to the live catalog and classifier services.
fn open_scanner(storage: &StorageArgs) -> Result<Scanner> {
    let (collection_path, genres_path) = resolve_paths(storage)?;

    let catalog = CatalogClientBuilder::new()
        .retries(storage.retries)
        .build()
        .context("Failed to create catalog client")?;
    let client = ClassifierClientBuilder::new()
        .retries(storage.retries)
        .build()
        .context("Failed to create classifier client")?;
    let classifier = GenreClassifierBuilder::new().client(Arc::new(client)).build();

    Scanner::open(&collection_path, &genres_path, Arc::new(catalog), classifier)
}

/// Handles the scan command by running the interactive prompt.
fn handle_scan(storage: &StorageArgs) -> Result<()> {
    let scanner = Arc::new(Mutex::new(open_scanner(storage)?));
    install_interrupt_handler(Arc::downgrade(&scanner))?;

    println!("Book Collection Scanner with genre classification");
    println!("Subjects from Open Library are used as classification context.");
    println!("Use Ctrl+C to save and exit at any time.");
    println!();

    run_interactive(&scanner, io::stdin().lock(), io::stdout())
}

/// Handles the add command by processing each ISBN argument in turn.
fn handle_add(storage: &StorageArgs, cmd: &AddCommand) -> Result<()> {
    let isbns = parse_isbns(&cmd.isbns);
    if isbns.is_empty() {
        anyhow::bail!("No valid ISBN given");
    }

    let mut scanner = open_scanner(storage)?;
    let mut stdout = io::stdout();
    for isbn in &isbns {
        let outcome = scanner.process(isbn);
        report_outcome(&mut stdout, &outcome)?;
    }

    scanner.flush()
}

/// Handles the genres command by printing the taxonomy.
fn handle_genres(storage: &StorageArgs) -> Result<()> {
    let (_, genres_path) = resolve_paths(storage)?;
    let taxonomy = Taxonomy::open(&genres_path)?;

    for label in taxonomy.labels() {
        println!("{label}");
    }
    Ok(())
}

/// Parses ISBN arguments, reporting and skipping invalid ones.
fn parse_isbns(raw: &[String]) -> Vec<Isbn> {
    raw.iter()
        .filter_map(|value| {
            let isbn = Isbn::parse(value);
            if isbn.is_none() {
                eprintln!("Invalid ISBN format, skipping: {value}");
            }
            isbn
        })
        .collect()
}
