use anyhow::Result;
use clinic_core::ClinicConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = ClinicConfig::with_defaults();
    config.load_env("CLINIC__");
    let config = config.snapshot();
    let addr = clinic_server::listen_addr(&config)?;

    let app = clinic_server::build(&config)?;

    // Storage is in memory, so it is ready as soon as the router exists.
    app.availability().mark_ready();

    app.listen(addr).await?;

    Ok(())
}
