//! Kind Registry CLI
//!
//! Browse kinds, print example events, lint the schema document and
//! manage configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kind_registry::{
    ExampleSynthesizer, FieldChain, KindRecord, KindRegistry, KindsConfig, OutputFormat,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kind-registry")]
#[command(about = "Browse event kinds and synthesize example events")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Kinds document, overriding the configured path
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List kinds, optionally filtered by a search query
    List {
        /// Matches kind number, description or tag names
        query: Option<String>,
    },

    /// Show one kind's schema
    Show {
        kind: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print an example event for a kind
    Example { kind: u32 },

    /// Lint the kinds document
    Lint {
        /// Exit non-zero on warnings too
        #[arg(long)]
        strict: bool,
    },

    /// View and manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long, conflicts_with = "toml")]
        json: bool,
    },

    /// Write a config file with default values
    Init {
        /// Output path
        #[arg(short, long, default_value = "kinds.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Resolve the schema path and load the document it names
    Check,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = KindsConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.schema {
        config.registry.path = path;
        config.registry.embedded_fallback = false;
    }
    if cli.compact {
        config.output.format = OutputFormat::Compact;
    }

    let command = match cli.command {
        Commands::Config { action } => return run_config(action, &config),
        command => command,
    };

    let registry = KindRegistry::open(&config).context("loading kinds document")?;

    match command {
        Commands::List { query } => {
            let query = query.unwrap_or_default();
            let found = registry.search(&query);

            if found.is_empty() {
                println!("No kinds match '{}'", query);
                let hints = registry.suggest(&query, 3);
                if !hints.is_empty() {
                    println!("\nDid you mean:");
                    for hint in hints {
                        println!("  {:>6}  {}", hint.kind.number, hint.kind.description);
                    }
                }
                return Ok(());
            }

            for kind in &found {
                println!("{:>6}  {}", kind.number, kind.description);
            }
            println!("\n{} of {} kinds ({})", found.len(), registry.len(), registry.source());
        }

        Commands::Show { kind, json } => {
            let record = registry
                .get(kind)
                .with_context(|| format!("kind {} is not in the registry", kind))?;

            if json {
                println!("{}", serde_json::to_string_pretty(record)?);
            } else {
                print_kind(record);
            }
        }

        Commands::Example { kind } => {
            let synthesizer = ExampleSynthesizer::new(config.synthesis);
            let event = registry.example(kind, &synthesizer)?;
            println!("{}", event.to_json(config.output.format)?);
        }

        Commands::Lint { strict } => {
            for skipped in registry.skipped() {
                println!("⚠️  {}", skipped);
            }

            let results = registry.lint();
            let mut errors = 0;
            let mut warnings = 0;

            for result in &results {
                println!("Kind {}", result.kind);
                for error in &result.errors {
                    println!("  ❌ {} at {}: {}", error.code, error.path, error.message);
                }
                for warning in &result.warnings {
                    println!("  ⚠️  {} at {}: {}", warning.code, warning.path, warning.message);
                }
                errors += result.errors.len();
                warnings += result.warnings.len();
            }

            println!();
            if errors == 0 && warnings == 0 {
                println!("✅ {} kinds, no issues", registry.len());
            } else {
                println!("{} error(s), {} warning(s) across {} kinds", errors, warnings, results.len());
            }

            if errors > 0 || (strict && warnings > 0) {
                std::process::exit(1);
            }
        }

        Commands::Config { .. } => unreachable!("handled before the registry is opened"),
    }

    Ok(())
}

fn run_config(action: ConfigAction, config: &KindsConfig) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show { toml, json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(config)?);
            } else {
                println!("Registry:");
                println!("  Path: {}", config.schema_path().display());
                println!("  Embedded fallback: {}", config.registry.embedded_fallback);
                println!("Output:");
                println!("  Format: {:?}", config.output.format);
                println!("Synthesis:");
                println!("  Unnamed tags: {:?}", config.synthesis.unnamed_tags);
                println!("  Constrained fields: {:?}", config.synthesis.constrained);
            }
        }

        ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
            }
            KindsConfig::default()
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("✅ Created config file: {}", output.display());
        }

        ConfigAction::Check => {
            let path = config.schema_path();
            if !path.exists() && !config.registry.embedded_fallback {
                anyhow::bail!("schema document {} does not exist", path.display());
            }

            let registry = KindRegistry::open(config)
                .with_context(|| format!("loading {}", path.display()))?;
            let summary = registry.summary();

            println!("✅ Schema document loads");
            println!("   Source:   {}", summary.source);
            println!("   Kinds:    {}", summary.kinds);
            println!("   Skipped:  {}", summary.skipped);
            println!("   Checksum: {}", summary.checksum);
            println!("   Loaded:   {}", summary.loaded_at.to_rfc3339());

            for skipped in registry.skipped() {
                println!("⚠️  {}", skipped);
            }
        }
    }

    Ok(())
}

fn print_kind(kind: &KindRecord) {
    println!("Kind {}: {}", kind.number, kind.description);
    println!("  Content: {}", kind.content);

    if kind.tags.is_empty() {
        println!("  Tags: none");
        return;
    }

    println!("  Tags:");
    for tag in &kind.tags {
        let note = match tag.chain {
            FieldChain::Malformed { .. } => "  (malformed chain)",
            FieldChain::Fields(_) => "",
        };
        println!("    {}{}", tag.signature(), note);
    }
}
