use crate::config::SearchConfig;
use crate::criteria::{SearchCriteria, SearchRequest};
use crate::query::compile;
use crate::reference::{CollectionKind, load_collections, load_taxonomy};
use crate::tracing::LogFormat;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "service-search")]
#[command(about = "Compile service directory searches into index queries", long_about = None)]
pub struct Cli {
    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a JSON search request into an index query body
    Compile {
        /// Request file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        request: PathBuf,
        #[arg(long)]
        taxonomy: PathBuf,
        #[arg(long)]
        collections: PathBuf,
        /// Config file (defaults to $SERVICE_SEARCH_CONFIG, then the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
        /// Print the query fingerprint instead of the body
        #[arg(long)]
        fingerprint: bool,
    },
    /// Load and validate reference snapshots
    Validate {
        #[arg(long)]
        taxonomy: PathBuf,
        #[arg(long)]
        collections: PathBuf,
    },
}

/// Options for [`execute_compile`].
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub request: PathBuf,
    pub taxonomy: PathBuf,
    pub collections: PathBuf,
    pub config: Option<PathBuf>,
    pub pretty: bool,
    pub fingerprint: bool,
}

fn read_request(path: &Path) -> anyhow::Result<SearchRequest> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request {}", path.display()))?
    };
    serde_json::from_str(&content).context("Failed to parse search request")
}

/// Compile a request file against snapshot files, returning the rendered output.
pub fn execute_compile(options: &CompileOptions) -> anyhow::Result<String> {
    let config = SearchConfig::discover(options.config.as_deref())
        .context("Failed to load search config")?;
    let taxonomy = load_taxonomy(&options.taxonomy).context("Failed to load taxonomy")?;
    let collections =
        load_collections(&options.collections).context("Failed to load collections")?;

    let request = read_request(&options.request)?;
    let criteria = SearchCriteria::try_from(request).context("Invalid search request")?;
    let document = compile(&criteria, &taxonomy, &collections, &config)
        .context("Failed to compile search")?;

    if options.fingerprint {
        return Ok(format!("{:016x}", document.fingerprint()));
    }

    let body = document.to_dsl();
    let output = if options.pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        body.to_string()
    };
    Ok(output)
}

/// Validate snapshot files and summarise their contents.
pub fn execute_validate(taxonomy: &Path, collections: &Path) -> anyhow::Result<String> {
    use crate::reference::TaxonomyProvider;

    let taxonomy = load_taxonomy(taxonomy).context("Failed to load taxonomy")?;
    let collections = load_collections(collections).context("Failed to load collections")?;

    let eligibility_types = taxonomy
        .service_eligibility_root()
        .map(|root| taxonomy.children(&root.id).len());

    let mut output = format!("Taxonomy: {} nodes\n", taxonomy.len());
    match eligibility_types {
        Some(count) => output.push_str(&format!("Eligibility types: {}\n", count)),
        None => output.push_str("Eligibility types: none (no \"Service Eligibility\" root)\n"),
    }
    output.push_str(&format!(
        "Collections: {} categories, {} personas\n",
        collections.count_of(CollectionKind::Category),
        collections.count_of(CollectionKind::Persona)
    ));
    Ok(output)
}
