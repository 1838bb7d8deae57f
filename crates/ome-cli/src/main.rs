use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ome_core::{AcceleratorSelectionPolicy, ComponentType};

mod commands;

use commands::{Context, OutputFormat};

#[derive(Parser)]
#[command(
    name = "omesel",
    about = "Pick serving runtimes and accelerator classes for inference workloads",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Engine configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Catalog file (TOML), loaded into an in-memory store
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Persistent catalog database
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serving runtime selection
    Runtime {
        #[command(subcommand)]
        action: RuntimeAction,
    },
    /// Accelerator class selection
    Accelerator {
        #[command(subcommand)]
        action: AcceleratorAction,
    },
    /// Load a catalog file into a persistent database.
    ///
    /// Requires both --catalog and --db.
    Import,
    /// Print a default engine configuration
    InitConfig,
}

#[derive(clap::Args)]
struct ModelArgs {
    /// Model descriptor (TOML)
    #[arg(short, long)]
    model: PathBuf,
    /// Inference service (TOML)
    #[arg(short, long)]
    workload: Option<PathBuf>,
    #[arg(short, long, default_value = "default")]
    namespace: String,
}

#[derive(Subcommand)]
enum RuntimeAction {
    /// Select the best runtime for a model
    Select {
        #[command(flatten)]
        args: ModelArgs,
    },
    /// List every compatible runtime, best first
    List {
        #[command(flatten)]
        args: ModelArgs,
    },
    /// Check a named runtime against a model
    Validate {
        name: String,
        #[command(flatten)]
        args: ModelArgs,
    },
}

#[derive(Subcommand)]
enum AcceleratorAction {
    /// Select the accelerator class for one workload component
    Select {
        /// Inference service (TOML)
        #[arg(short, long)]
        workload: PathBuf,
        /// Serving runtime name
        #[arg(short, long)]
        runtime: String,
        #[arg(short, long, default_value = "default")]
        namespace: String,
        /// engine or decoder
        #[arg(short, long, default_value = "engine")]
        component: ComponentType,
    },
    /// Score a runtime's accelerator classes under a policy
    Rank {
        #[arg(short, long)]
        runtime: String,
        #[arg(short, long, default_value = "default")]
        namespace: String,
        /// BestFit, Cheapest, MostCapable or FirstAvailable
        #[arg(short, long, default_value = "BestFit")]
        policy: AcceleratorSelectionPolicy,
        /// Inference service supplying constraints (TOML)
        #[arg(short, long)]
        workload: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive("ome=info".parse()?);
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match cli.command {
        Commands::Import => commands::import::import(cli.catalog.as_deref(), cli.db.as_deref()),
        Commands::InitConfig => commands::init_config(),
        Commands::Runtime { action } => {
            let ctx = Context::load(cli.config.as_deref(), cli.catalog.as_deref(), cli.db.as_deref(), cli.format)?;
            match action {
                RuntimeAction::Select { args } => commands::runtime::select(
                    &ctx,
                    &args.model,
                    args.workload.as_deref(),
                    &args.namespace,
                ),
                RuntimeAction::List { args } => commands::runtime::list(
                    &ctx,
                    &args.model,
                    args.workload.as_deref(),
                    &args.namespace,
                ),
                RuntimeAction::Validate { name, args } => commands::runtime::validate(
                    &ctx,
                    &name,
                    &args.model,
                    args.workload.as_deref(),
                    &args.namespace,
                ),
            }
        }
        Commands::Accelerator { action } => {
            let ctx = Context::load(cli.config.as_deref(), cli.catalog.as_deref(), cli.db.as_deref(), cli.format)?;
            match action {
                AcceleratorAction::Select {
                    workload,
                    runtime,
                    namespace,
                    component,
                } => commands::accelerator::select(&ctx, &workload, &runtime, &namespace, component),
                AcceleratorAction::Rank {
                    runtime,
                    namespace,
                    policy,
                    workload,
                } => commands::accelerator::rank(&ctx, &runtime, &namespace, policy, workload.as_deref()),
            }
        }
    }
}
