use tokio_util::sync::CancellationToken;

/// Install a handler for Ctrl-C (and SIGTERM on unix).
///
/// Returns a `CancellationToken` that is cancelled when a signal arrives,
/// so the realtime driver can stop pacing and print its summary.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let handle = token.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received Ctrl-C, stopping simulation");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, stopping simulation");
                }
            }
        }
        #[cfg(not(unix))]
        {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl-C, stopping simulation");
            }
        }
        handle.cancel();
    });

    token
}
