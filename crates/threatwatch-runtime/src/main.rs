//! threatwatch: operator console for monitoring autonomous field units.
//!
//! `console` (the default) runs the live stream/map/command loop;
//! `assign`, `register` and `telemetry` send a single command and exit.

use clap::Parser;

mod cli;
mod cmd_send;
mod console;
mod operator;

fn init_tracing() {
    let filter = std::env::var("THREATWATCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    init_tracing();

    let config = args.link_config();
    config.validate()?;

    match args.command.unwrap_or(cli::Command::Console) {
        cli::Command::Console => {
            tracing::info!(stream_url = %config.stream_url, "threatwatch console starting");
            console::cmd_console(config).await?;
        }
        cli::Command::Assign(opts) => cmd_send::cmd_assign(config, &opts).await?,
        cli::Command::Register(opts) => cmd_send::cmd_register(config, &opts).await?,
        cli::Command::Telemetry(opts) => cmd_send::cmd_telemetry(config, &opts).await?,
    }

    Ok(())
}
