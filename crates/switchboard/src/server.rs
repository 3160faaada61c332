//! Main switchboard server wiring.

use crate::channels;
use crate::config::Config;
use crate::engine::Engine;
use crate::http_server::{ApiServer, AppState};
use crate::metrics::MetricsRegistry;
use crate::monitor::ChannelMonitor;
use liveness::HttpProber;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

/// Switchboard server
pub struct SwitchboardServer {
    config: Config,
}

impl SwitchboardServer {
    /// Create a new server from configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Starting switchboard server");

        let metrics = Some(Arc::new(MetricsRegistry::new()));

        let prober = Arc::new(HttpProber::new(self.config.to_prober_settings())?);
        let engine = Arc::new(Engine::new(
            prober,
            self.config.to_engine_settings(),
            metrics.clone(),
        ));

        // First channel load; a broken list at startup is not fatal, the
        // server comes up empty and a later reload can fix it
        let channels_file = PathBuf::from(&self.config.server.channels_file);
        match channels::load_channels(&channels_file) {
            Ok(groups) => engine.update_config(groups).await,
            Err(e) => {
                warn!(error = %e, path = %channels_file.display(),
                      "initial channel load failed, starting empty");
            }
        }

        // Background monitor for silently dying current candidates
        let monitor = ChannelMonitor::new(engine.clone(), self.config.monitor.period);
        monitor.start().await;

        // Optional periodic channel list reload
        let reload_handle = self.config.reload.interval.map(|period| {
            let engine = engine.clone();
            let path = channels_file.clone();
            tokio::spawn(async move {
                Self::reload_task(engine, path, period).await;
            })
        });

        // HTTP API
        let state = Arc::new(AppState {
            engine,
            metrics,
            channels_file,
        });
        let api = ApiServer::new(state, self.config.server.listen.clone());
        let api_handle = tokio::spawn(async move {
            if let Err(e) = api.run().await {
                warn!(error = %e, "API server error");
            }
        });

        info!("All tasks spawned, server running");

        // The API task runs for the process lifetime; the reload task, if
        // any, only ends on failure
        tokio::select! {
            _ = api_handle => {
                info!("API server task completed");
            }
            _ = async {
                if let Some(handle) = reload_handle {
                    handle.await
                } else {
                    std::future::pending::<()>().await;
                    Ok(())
                }
            } => {
                info!("Reload task completed");
            }
        }

        info!("Switchboard server stopped");
        Ok(())
    }

    /// Periodic channel list re-read
    async fn reload_task(engine: Arc<Engine>, path: PathBuf, period: Duration) {
        info!(period_secs = period.as_secs(), "periodic channel reload enabled");
        let mut reload_interval = interval(period);
        reload_interval.tick().await; // Skip first immediate tick

        loop {
            reload_interval.tick().await;

            match channels::load_channels(&path) {
                Ok(groups) => engine.update_config(groups).await,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "periodic channel reload failed");
                }
            }
        }
    }
}
