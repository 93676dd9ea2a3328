//! Data Patcher CLI
//!
//! Command-line host for applying data patches to keyed game data tables.

mod config;

use clap::{Parser, Subcommand};
use config::{load_asset, load_context, save_asset, CliError, PatchConfig};
use dp_core::{MemoryMonitor, Monitor, TracingMonitor};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dp-cli")]
#[command(about = "Data Patcher for keyed game data tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a patch file to a data file
    Apply {
        /// Path to the data file (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Path to the patch file (JSON)
        #[arg(short, long)]
        patch: PathBuf,

        /// Path to a token values file (JSON object of name -> value)
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Where to write the patched data (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the tokens a patch depends on
    Tokens {
        /// Path to the patch file (JSON)
        #[arg(short, long)]
        patch: PathBuf,
    },

    /// Create a patch file template
    CreatePatch {
        /// Asset the patch edits
        #[arg(short, long)]
        target: String,

        /// Name shown in log messages
        #[arg(short, long, default_value = "My Patch")]
        log_name: String,

        /// Output path for the patch file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> config::Result<()> {
    match cli.command {
        Commands::Apply {
            data,
            patch,
            context,
            output,
        } => cmd_apply(&data, &patch, context.as_ref(), output.as_ref()),
        Commands::Tokens { patch } => cmd_tokens(&patch),
        Commands::CreatePatch {
            target,
            log_name,
            output,
        } => cmd_create_patch(&target, &log_name, &output),
    }
}

/// Logs through `tracing` and keeps a copy for the summary
struct CliMonitor {
    memory: Rc<MemoryMonitor>,
}

impl Monitor for CliMonitor {
    fn log(&self, message: &str, level: dp_core::LogLevel) {
        TracingMonitor.log(message, level);
        self.memory.log(message, level);
    }
}

fn cmd_apply(
    data_path: &PathBuf,
    patch_path: &PathBuf,
    context_path: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> config::Result<()> {
    let config = PatchConfig::load(patch_path)?;
    let mut asset = load_asset(data_path)?;
    let context = match context_path {
        Some(path) => load_context(path)?,
        None => BTreeMap::new(),
    };
    debug!(tokens = context.len(), "loaded token context");

    let memory = Rc::new(MemoryMonitor::new());
    let mut patch = config.build(Box::new(CliMonitor {
        memory: Rc::clone(&memory),
    }));
    patch.update_context(&context);

    if !patch.is_ready() {
        println!(
            "Warning: patch '{}' references tokens with no value; they are left as written",
            patch.log_name()
        );
    }

    if patch.target() != asset.name {
        return Err(CliError::TargetMismatch {
            patch: patch.log_name().to_string(),
            target: patch.target().to_string(),
            asset: asset.name.clone(),
        });
    }

    println!(
        "Applying patch '{}' to {} ({} records)",
        patch.log_name(),
        asset.name,
        asset.record_count().unwrap_or(0)
    );

    match patch.edit(&mut asset)? {
        Some(summary) => {
            println!("  {} records set", summary.records_set);
            println!("  {} records removed", summary.records_removed);
            println!("  {} fields edited", summary.fields_edited);
            info!(patch = patch.log_name(), ?summary, "patch applied");
        }
        None => println!("  asset was not edited"),
    }

    let warnings = memory.warnings();
    if !warnings.is_empty() {
        println!("\nWarnings ({}):", warnings.len());
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }

    match output {
        Some(path) => {
            save_asset(&asset, path)?;
            println!("\nWrote {}", path.display());
        }
        None => {
            println!();
            println!("{}", serde_json::to_string_pretty(&asset)?);
        }
    }

    Ok(())
}

fn cmd_tokens(patch_path: &PathBuf) -> config::Result<()> {
    let config = PatchConfig::load(patch_path)?;
    let patch = config.build(Box::new(TracingMonitor));

    let tokens = patch.tokens_used();
    println!("Patch '{}' uses {} token(s):", patch.log_name(), tokens.len());
    for token in tokens.iter() {
        println!("  {}", token);
    }
    println!(
        "{} of its values change with the context",
        patch.tracker().len()
    );

    Ok(())
}

fn cmd_create_patch(target: &str, log_name: &str, output: &PathBuf) -> config::Result<()> {
    let mut config = PatchConfig::new(log_name, target);
    config.entries = Some(BTreeMap::from([
        ("NewKey".to_string(), Some("Field0/Field1/{{Token}}".to_string())),
        ("RemovedKey".to_string(), None),
    ]));
    config.fields = Some(BTreeMap::from([(
        "ExistingKey".to_string(),
        BTreeMap::from([(0, "NewValue".to_string())]),
    )]));

    config.save(output)?;
    println!("Created patch file: {}", output.display());
    println!("Target: {}", target);
    println!();
    println!("Edit the file to add your changes, then run:");
    println!(
        "  dp-cli apply --data <data.json> --patch {} --context <tokens.json>",
        output.display()
    );

    Ok(())
}
