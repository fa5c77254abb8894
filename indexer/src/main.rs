use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use resto_core::persist::{load_index, save_meta, save_snapshot, IndexPaths, MetaFile, SNAPSHOT_VERSION};
use resto_core::{FilterRequest, Mode, QueryRequest, SearchEngine, SearchOutcome, TermPolicy};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

mod corpus;
mod table;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query the restaurant TF-IDF index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a JSON/JSONL/TSV file or a directory of them
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long, default_value = "./index")]
        output: String,
    },
    /// Run one query against a built index and print the results
    Search(SearchArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// Free-text query
    #[arg(long, short)]
    query: String,
    /// Retrieval mode: boolean, ranked or boosted
    #[arg(long, default_value = "ranked")]
    mode: Mode,
    /// Number of results to show
    #[arg(short, default_value_t = 5)]
    k: usize,
    /// Unknown term policy: strict or extend
    #[arg(long, default_value = "strict")]
    policy: TermPolicy,
    /// Facility to boost (repeatable)
    #[arg(long = "facility")]
    facilities: Vec<String>,
    /// Cuisine to boost (repeatable)
    #[arg(long = "cuisine")]
    cuisines: Vec<String>,
    /// Lowest price band, in € symbols
    #[arg(long, default_value_t = 1)]
    price_min: u8,
    /// Highest price band, in € symbols
    #[arg(long, default_value_t = 4)]
    price_max: u8,
    /// Required region (with --strict-filter)
    #[arg(long)]
    region: Option<String>,
    /// Accepted credit card (repeatable, with --strict-filter)
    #[arg(long = "card")]
    credit_cards: Vec<String>,
    /// Drop results outside the region or without a requested card
    #[arg(long, default_value_t = false)]
    strict_filter: bool,
}

impl SearchArgs {
    fn request(&self) -> QueryRequest {
        let mut request = QueryRequest::new(self.query.clone(), self.mode, self.k).with_policy(self.policy);
        if self.mode == Mode::Boosted {
            request = request.with_filter(FilterRequest {
                facilities: self.facilities.iter().cloned().collect(),
                cuisines: self.cuisines.iter().cloned().collect(),
                price_min: self.price_min,
                price_max: self.price_max,
                region: self.region.clone(),
                credit_cards: self.credit_cards.iter().cloned().collect(),
                strict: self.strict_filter,
            });
        }
        request
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_index(&input, &output),
        Commands::Search(args) => search(&args),
    }
}

fn build_index(input: &str, output: &str) -> Result<()> {
    let records = corpus::load_records(Path::new(input))?;
    tracing::info!(num_docs = records.len(), input, "loaded corpus");

    let engine = SearchEngine::build(records);
    let out_paths = IndexPaths::new(output);
    save_snapshot(&out_paths, &engine)?;

    let meta = MetaFile {
        num_docs: engine.index().num_docs(),
        num_terms: engine.index().num_terms(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: SNAPSHOT_VERSION,
    };
    save_meta(&out_paths, &meta)?;

    tracing::info!(output, num_terms = meta.num_terms, "index build complete");
    Ok(())
}

fn search(args: &SearchArgs) -> Result<()> {
    let (engine, _meta) = load_index(&IndexPaths::new(&args.index))?;
    let outcome = engine.search(&args.request())?;
    match &outcome {
        SearchOutcome::NoRecognizedTerms => println!("No recognized terms in query. Try something else."),
        SearchOutcome::NoMatch => println!("No restaurants match the query. Try something else."),
        SearchOutcome::Matched { documents } => {
            println!("We found {} matches!\n", documents.len());
            let rows: Vec<_> = documents.iter().take(args.k).map(|d| (*d, None)).collect();
            print!("{}", table::render(&engine, &rows));
        }
        SearchOutcome::Ranked { candidates, results } => {
            println!("Top {} of {} candidates\n", results.len(), candidates);
            let rows: Vec<_> = results.iter().map(|r| (r.doc_id, Some(r.score))).collect();
            print!("{}", table::render(&engine, &rows));
        }
    }
    Ok(())
}
