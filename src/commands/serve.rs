//! Serve command - Starts the HTTP server and supervises its shutdown.

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    tracing::info!("Database connected");

    let app = create_router(AppState::from_connection(db.get_connection()));

    let host = args.host.unwrap_or_else(|| config.server_host.clone());
    let port = args.port.unwrap_or(config.server_port);
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    run_until_shutdown(listener, app, shutdown_signal(), config.shutdown_timeout).await?;

    if let Err(e) = db.connection().clone().close().await {
        tracing::warn!("Error closing database pool: {}", e);
    }
    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Serve `app` until `signal` resolves, then drain in-flight requests.
///
/// Once the signal fires the listener stops accepting. Requests already
/// running get `drain_timeout` to finish before the server is abandoned.
pub async fn run_until_shutdown<F>(
    listener: TcpListener,
    app: axum::Router,
    signal: F,
    drain_timeout: Duration,
) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (triggered_tx, triggered_rx) = tokio::sync::oneshot::channel::<()>();

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        signal.await;
        let _ = triggered_tx.send(());
    });
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server => return flatten(result),
        Ok(()) = triggered_rx => {
            tracing::info!("Received shutdown signal, draining in-flight requests...");
        }
    }

    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(result) => flatten(result),
        Err(_) => {
            server.abort();
            tracing::warn!(
                "Shutdown deadline of {:?} exceeded, abandoning in-flight requests",
                drain_timeout
            );
            Ok(())
        }
    }
}

fn flatten(result: Result<std::io::Result<()>, tokio::task::JoinError>) -> AppResult<()> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::internal(format!("Server error: {}", e))),
        Err(e) => Err(AppError::internal(format!("Server task failed: {}", e))),
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    async fn bind() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn test_stops_when_signal_fires() {
        let app = axum::Router::new().route("/", get(|| async { "ok" }));

        let result = run_until_shutdown(bind().await, app, async {}, Duration::from_secs(1)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_deadline_abandons_stuck_requests() {
        let app = axum::Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "late"
            }),
        );
        let listener = bind().await;
        let addr = listener.local_addr().unwrap();

        let (go_tx, go_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(run_until_shutdown(
            listener,
            app,
            async move {
                let _ = go_rx.await;
            },
            Duration::from_millis(100),
        ));

        // Park one request inside the handler, then ask for shutdown.
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        tokio::io::AsyncWriteExt::write_all(
            &mut stream,
            b"GET /slow HTTP/1.1\r\nHost: localhost\r\n\r\n",
        )
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        go_tx.send(()).unwrap();

        let finished = tokio::time::timeout(Duration::from_secs(5), server).await;
        assert!(finished.is_ok(), "supervisor should give up at the deadline");
        assert!(finished.unwrap().unwrap().is_ok());
    }
}
