pub mod api;
pub mod authenticator;
pub mod ceremony;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flow;
pub mod identity;
pub mod platform;
pub mod up;

pub use error::{Error, Result};
pub use up::UserPresenceProof;

use authenticator::SoftwareAuthenticator;
use up::{AutoConfirm, Pinentry, PresenceCheck};

pub async fn run(cfg: config::Config) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    let level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting ceremonium");

    // Preflight checks
    diagnostics::check(&cfg)?;

    let identity = identity::Identity::parse(cfg.identity.as_str())
        .map_err(|e| anyhow::anyhow!("invalid --identity: {e}"))?;
    let server = api::HttpCeremonyServer::new(cfg.server_url()?)?;
    let origin = cfg.origin_url()?;
    tracing::info!(server = %cfg.server, origin = %origin, "Configuration loaded");

    if cfg.yes {
        sign_in(&cfg, &server, SoftwareAuthenticator::new(origin, AutoConfirm), &identity).await
    } else {
        let timeout = std::time::Duration::from_secs(cfg.presence_timeout);
        let presence = Pinentry::new(cfg.pinentry.as_str(), timeout);
        sign_in(&cfg, &server, SoftwareAuthenticator::new(origin, presence), &identity).await
    }
}

async fn sign_in<C: PresenceCheck>(
    cfg: &config::Config,
    server: &api::HttpCeremonyServer,
    authenticator: SoftwareAuthenticator<C>,
    identity: &identity::Identity,
) -> anyhow::Result<()> {
    let authenticator = match &cfg.rp_id {
        Some(rp_id) => authenticator.with_default_rp_id(rp_id.clone()),
        None => authenticator,
    };
    let outcome = flow::sign_in(server, &authenticator, identity).await?;
    println!("{outcome}");
    Ok(())
}
