use crate::utils::run_until_ctrl_c;
use clap::{value_parser, Parser, Subcommand};

pub mod args;
pub mod commands;

/// The main Sluice CLI interface
#[derive(Debug, Parser)]
#[command(author, version, about = "Sluice", long_about = None)]
pub struct Cli {
    /// The command to execute
    #[clap(subcommand)]
    command: Commands,

    /// The verbosity level
    #[clap(long, short, global = true, default_value_t = 2, value_parser = value_parser!(u8).range(..=4))]
    verbosity: u8,
}

impl Cli {
    /// Get the log level based on the verbosity level
    pub fn get_log_level(&self) -> String {
        match self.verbosity {
            0 => "error",
            1 => "warn",
            2 => "info",
            3 => "debug",
            _ => "trace",
        }
        .into()
    }
}

/// Commands to be executed
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the bundler with all components (bundler engine, user operation store, RPC server)
    #[command(name = "node")]
    Node(Box<commands::NodeCommand>),
}

pub fn run() -> eyre::Result<()> {
    let cli = Cli::parse();

    let rust_log = match std::env::var("RUST_LOG") {
        Ok(val) => format!("{val},sluice={}", cli.get_log_level()),
        Err(_) => format!("sluice={}", cli.get_log_level()),
    };
    std::env::set_var("RUST_LOG", rust_log);
    tracing_subscriber::fmt::init();

    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    let task = async move {
        match cli.command {
            Commands::Node(command) => command.execute().await,
        }
    };

    rt.block_on(run_until_ctrl_c(task))
}
