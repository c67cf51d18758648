use anyhow::Result;
use tracing::info;

use parkgate_infrastructure::start_scheduler;

use crate::context::AppContext;

/// Run the service until a shutdown signal arrives, then stop the
/// scheduler cleanly.
pub async fn run_standalone() -> Result<()> {
    let context = AppContext::new().await?;
    let state = context.state;

    info!(
        data_dir = %state.config.data_dir.display(),
        "parkgate backend started"
    );
    let scheduler = start_scheduler(state.clone());

    shutdown_signal().await;
    info!("shutdown signal received");

    scheduler.stop().await;
    info!("parkgate backend stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
