use anyhow::{Context, Result};
use clap::Args;
use scholia_core::format::render_all;
use scholia_core::utils::strip_punctuation;
use scholia_core::{
    CacheStore, Config, Language, Lexicon, MorpheusClient, OutputFormat, ResolveOptions, Resolver,
    SynonymTable,
};
use scholia_greek::{load_lexicon, DccLoader, LiddellLoader};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args)]
pub struct LookupArgs {
    /// Words to resolve, in order
    #[arg(required = true)]
    words: Vec<String>,

    /// latex, markdown, html or text
    #[arg(long, default_value = "markdown")]
    format: OutputFormat,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the remote morphology service
    #[arg(long)]
    no_remote: bool,

    /// Greek core vocabulary list
    #[arg(long, default_value = "data/dcc_greek_core.csv")]
    csv: PathBuf,

    /// Greek historical lexicon
    #[arg(long, default_value = "data/middle_liddell.xml")]
    xml: PathBuf,

    /// Cache file (overrides the configured one)
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Surrounding words used to annotate multi-sense entries
    #[arg(long)]
    context: Option<String>,

    /// JSON synonym table
    #[arg(long)]
    synonyms: Option<PathBuf>,

    /// Print full records as JSON instead of formatted entries
    #[arg(long)]
    json: bool,
}

pub fn run(args: LookupArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(path) = args.cache {
        config.cache.path = Some(path);
    }

    let store = match &config.cache.path {
        Some(path) => CacheStore::open(path),
        None => CacheStore::in_memory(),
    };

    let lexicon = match config.language {
        Language::Greek => load_lexicon(&DccLoader::new(), &args.csv, &LiddellLoader::new(), &args.xml)?,
        Language::Latin => Lexicon::new(),
    };

    let options = ResolveOptions {
        use_remote: config.defaults.use_remote && !args.no_remote,
        ..config.defaults
    };

    let mut builder = Resolver::builder(lexicon.clone())
        .config(&config)
        .cache_store(store.clone())
        .lemma_lookup(lexicon);
    if options.use_remote {
        builder = builder.remote(MorpheusClient::new(&config.remote, config.language, store)?);
    }
    if let Some(path) = &args.synonyms {
        builder = builder.synonyms(
            SynonymTable::load(path)
                .with_context(|| format!("Failed to load synonyms: {}", path.display()))?,
        );
    }
    let resolver = builder.build();

    let context = args.context.as_deref().map(tokens).unwrap_or_default();
    let words = tokens(&args.words.join(" "));

    let defs: Vec<_> = words
        .iter()
        .map(|w| {
            if context.is_empty() {
                resolver.resolve(w, &options)
            } else {
                resolver.resolve_in_context(w, &context, &options)
            }
        })
        .collect();

    for def in &defs {
        for note in &def.errors {
            warn!(word = %def.word, source = ?note.source, kind = ?note.kind, "{}", note.message);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&defs)?);
    } else {
        println!("{}", render_all(&defs, args.format));
    }

    let (hits, misses) = resolver.cache_stats();
    info!(hits, misses, "lookup finished");
    resolver.close()?;
    Ok(())
}

/// Split running text into lookup words, dropping edge punctuation and
/// tokens that were punctuation only.
fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(strip_punctuation)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
