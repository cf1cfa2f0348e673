use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use webhook_relay_service::chat::GatewayChatClient;
use webhook_relay_service::config::{HookConfig, Settings};
use webhook_relay_service::server::{create_app, AppState, WebhookService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Load and validate configuration
    let settings = Settings::new()?;
    let hook = HookConfig::from_settings(&settings.hook)?;
    tracing::info!("Configuration loaded");

    // Create the service: chat client, compiled templates, shared state
    let chat = Arc::new(GatewayChatClient::new(&settings.chat)?);
    let service = Arc::new(WebhookService::new(hook, chat)?);
    let state = AppState {
        service: service.clone(),
    };
    tracing::info!("Webhook service initialized");

    // Reload configuration on SIGHUP; a path or method change re-registers
    // the route by restarting the serve loop below.
    let (restart_tx, _) = broadcast::channel::<()>(4);
    spawn_reload_task(service.clone(), restart_tx.clone());

    let addr = settings.server_addr();
    loop {
        let app = create_app(state.clone())?;
        let listener = TcpListener::bind(&addr).await?;
        let config = service.config();
        tracing::info!(
            "Webhook available at: {} http://{}{}",
            config.method,
            addr,
            config.path
        );

        let restarting = Arc::new(AtomicBool::new(false));
        let flag = restarting.clone();
        let mut restart_rx = restart_tx.subscribe();

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = restart_rx.recv() => {
                        tracing::info!("Re-registering webhook route");
                        flag.store(true, Ordering::SeqCst);
                    }
                }
            })
            .await?;

        if !restarting.load(Ordering::SeqCst) {
            break;
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(unix)]
fn spawn_reload_task(service: Arc<WebhookService>, restart_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        let mut hangup = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler");
                return;
            }
        };
        while hangup.recv().await.is_some() {
            tracing::info!("Received SIGHUP, reloading configuration");
            match Settings::new().and_then(|s| HookConfig::from_settings(&s.hook)) {
                Ok(new_config) => {
                    let actions = service.reload(new_config);
                    if actions.route_changed {
                        let _ = restart_tx.send(());
                    } else if actions.is_noop() {
                        tracing::debug!("Configuration unchanged");
                    }
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Configuration reload failed, keeping previous configuration"
                    );
                }
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_task(_service: Arc<WebhookService>, _restart_tx: broadcast::Sender<()>) {}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
