use crate::calculate::{run_calculate, run_types, CalculateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use greenwallet::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "GreenWallet",
    about = "Estimate savings, CO2 reduction and points for eco-friendly actions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a single calculator and print the result
    Calculate(CalculateArgs),
    /// List the supported calculation types
    Types,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calculate(args) => run_calculate(args),
        Command::Types => run_types(),
    }
}
