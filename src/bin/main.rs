use clap::Parser;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use labzone::{CliOverrides, Config, Responder, Server};

#[derive(Parser)]
#[command(name = "labzone")]
#[command(version)]
#[command(about = "Tiny authoritative DNS responder for a fixed set of A records")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// UDP port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(
        cli.config.as_deref(),
        CliOverrides {
            bind_address: cli.bind,
            port: cli.port,
            log_level: cli.log_level,
        },
    )?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(config.log_filter()?)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting labzone v{}", env!("CARGO_PKG_VERSION"));

    let responder = Responder::from_config(&config)?;
    let server = Server::bind(config.listen_addr(), responder)?;

    // queries are handled one at a time until the socket fails
    server.run()?;

    Ok(())
}
