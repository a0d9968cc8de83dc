use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use sales_api::{logging, router, state::AppState};
use sales_auth::{Authenticator, key_pair_from_pem};
use sales_config::Config;
use sales_web::{Shutdown, ShutdownSignal};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info};

/// Build identifier reported by `/liveness`.
const BUILD: &str = env!("CARGO_PKG_VERSION");

/// Why the server is stopping.
#[derive(Debug)]
enum Stop {
    /// SIGINT or SIGTERM from the OS.
    Os(ShutdownSignal),
    /// A request hit an integrity failure and asked the process to stop.
    App(ShutdownSignal),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let _log_guard = logging::init_tracing(cfg.log_dir.as_deref())?;

    if let Err(err) = run(cfg).await {
        error!(error = ?err, "service stopped with error");
        return Err(err);
    }
    Ok(())
}

async fn run(cfg: Config) -> Result<()> {
    info!(build = BUILD, "starting service");
    info!(config = %cfg, "configuration");

    let pem = fs::read_to_string(&cfg.auth.private_key_file)
        .with_context(|| format!("reading auth private key {}", cfg.auth.private_key_file))?;
    let (private_key, public_key) = key_pair_from_pem(&pem)?;

    let kid = cfg.auth.key_id.clone();
    let lookup = move |k: &str| (k == kid).then(|| public_key.clone());
    let auth = Authenticator::new(
        &cfg.auth.algorithm,
        lookup,
        HashMap::from([(cfg.auth.key_id.clone(), private_key)]),
    )
    .context("constructing authenticator")?;

    let db = sales_db::open(&cfg.db);

    let (shutdown, mut shutdown_rx) = Shutdown::channel();
    let state = AppState::new(db.clone(), Arc::new(auth), BUILD);
    let app = router::api(shutdown, state).context("registering routes")?;
    let app = router::init_router(app, cfg.web.read_timeout, cfg.web.write_timeout);

    let listener = TcpListener::bind(&cfg.web.api_host)
        .await
        .with_context(|| format!("binding {}", cfg.web.api_host))?;
    info!(host = %cfg.web.api_host, "API listening");

    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                drain_rx.await.ok();
            })
            .await
    });

    let stop = tokio::select! {
        result = &mut server => {
            return match result {
                Ok(served) => served.context("server error"),
                Err(err) => Err(err).context("server task"),
            };
        }
        sig = os_signal() => Stop::Os(sig),
        Some(sig) = shutdown_rx.recv() => Stop::App(sig),
    };

    info!(stop = ?stop, "shutdown started");
    drain_tx.send(()).ok();

    match tokio::time::timeout(cfg.web.shutdown_timeout, &mut server).await {
        Ok(Ok(served)) => served.context("server error during shutdown")?,
        Ok(Err(err)) => return Err(err).context("server task"),
        Err(_) => {
            server.abort();
            bail!(
                "could not stop server gracefully within {:?}",
                cfg.web.shutdown_timeout
            );
        }
    }

    db.close().await;
    info!(stop = ?stop, "shutdown complete");

    if let Stop::App(_) = stop {
        bail!("integrity issue caused shutdown");
    }
    Ok(())
}

async fn os_signal() -> ShutdownSignal {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => ShutdownSignal::Interrupt,
        _ = terminate => ShutdownSignal::Terminate,
    }
}
