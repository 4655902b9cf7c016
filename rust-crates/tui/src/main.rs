use clap::Parser;
use color_eyre::eyre::Result;
use cryptoshambo::{
    cli::Cli,
    client,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _log_guard = client::init_tracing(&cli.log_dir)?;
    tracing::info!("starting cryptoshambo client");
    let app_config = cli.into_config()?;
    client::run_app(app_config).await
}
