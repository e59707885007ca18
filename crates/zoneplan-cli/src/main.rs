use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "zoneplan",
    about = "zoneplan — availability-zone placement planner",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Log every zone decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the placement for a request file without applying it.
    ///
    /// The request lists the job's desired instance count, its zones in
    /// priority order, and the instances already running.
    Plan {
        /// Path to the request file (TOML)
        #[arg(short, long)]
        file: String,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Validate a request file
    Check {
        #[arg(short, long)]
        file: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "zoneplan=debug" } else { "zoneplan=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(level.parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Plan { file, format } => commands::plan::plan(&file, &format),
        Commands::Check { file } => commands::plan::check(&file),
    }
}
