use clap::Parser;

mod cli;
pub mod exit_codes;
mod telemetry;

use cli::args::Cli;
use cli::commands::dispatch;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_format, tracing::Level::INFO);

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:#}");
            exit_codes::CONFIG_ERROR
        }
    };
    std::process::exit(code);
}
