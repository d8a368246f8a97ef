use crate::demo::{run_demo, run_portfolio_report, DemoArgs, PortfolioReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use tender_flow::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Tender Flow",
    about = "Run and demonstrate the 32-stage procurement workflow service from the command line",
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
    /// Generate a portfolio report from a ledger export or sample data
    Report(PortfolioReportArgs),
    /// Run an end-to-end CLI demo covering the full project lifecycle
    Demo(DemoArgs),
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
        Command::Report(args) => run_portfolio_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
