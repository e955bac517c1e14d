use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};
use vmrig::{AppError, Cli, run};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    install_tracing(&cli.log);

    match run(cli).await {
        Ok(()) => {}
        Err(AppError::Reported) => std::process::exit(1),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
}

pub fn install_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}
