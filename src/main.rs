use clap::Parser;
use hsts_check::cli::Cli;
use hsts_check::engine::Runner;
use hsts_check::probe::TlsProbe;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = cli.into_config()?;

    let mut hosts = hsts_check::input::load_hostlist(&cfg.input).await?;
    let runner = Runner::new(TlsProbe::new(&cfg));
    runner.run_all(&mut hosts).await?;

    let stdout = std::io::stdout();
    hsts_check::output::write_results(&mut stdout.lock(), &cfg.output, &hosts)?;

    Ok(())
}
