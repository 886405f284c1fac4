use clap::{Parser, Subcommand};
use configure::{
    commands::{deps, sync},
    init_tracing, logger, GlobalOpts, RunStatus, FATAL_EXIT_CODE,
};

#[derive(Parser)]
#[command(name = "configure")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Sync plugin-derived files of the workspace",
    long_about = "configure regenerates the plugin registry, the aggregator dependencies and the workspace member list from the plugin crates on disk, and audits dependency versions across all crates."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit dependencies and regenerate derived files (default)
    Sync {
        /// Report stale files without writing anything
        #[arg(long)]
        check: bool,
    },
    /// List external dependencies with their version constraints
    Deps {
        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

fn run(cli: Cli) -> anyhow::Result<RunStatus> {
    let layout = cli.global.load_layout()?;

    let log_file = layout.log_file.as_ref().map(|p| layout.root.join(p));
    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), log_file.as_deref())
    {
        logger::warn(&format!("Failed to initialize log file: {}", e));
    }

    match cli.command.unwrap_or(Commands::Sync { check: false }) {
        Commands::Sync { check } => sync::run_sync(&layout, check),
        Commands::Deps { json } => deps::list_deps(&layout, json),
    }
}

fn main() {
    let cli = Cli::parse();

    let verbosity = cli.global.verbosity_level();
    logger::set_verbosity(verbosity);
    init_tracing(verbosity);

    let code = match run(cli) {
        Ok(status) => status.exit_code(),
        Err(e) => {
            logger::error(&format!("{:#}", e));
            logger::show_log_path();
            FATAL_EXIT_CODE
        }
    };
    std::process::exit(code);
}
