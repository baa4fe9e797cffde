//! Listener host with bounded graceful shutdown.

use axum::Router;
use std::{future::Future, io, time::Duration};
use thiserror::Error;
use tokio::{net::TcpListener, signal, sync::oneshot};
use tokio_util::sync::CancellationToken;

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Accepting or serving connections failed.
    #[error("failed to serve: {0}")]
    Io(#[from] io::Error),
    /// In-flight requests were still running when the drain timeout expired.
    #[error("graceful shutdown timed out after {0:?}")]
    DrainTimeout(Duration),
}

/// Serves `router` until `signal` completes, then drains in-flight requests.
///
/// The drain is bounded by `drain_timeout`. When it expires `shutdown` is cancelled, which aborts
/// the store calls of any request still running, and [`ServerError::DrainTimeout`] is returned.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
    drain_timeout: Duration,
    signal: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (draining_tx, draining_rx) = oneshot::channel();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            signal.await;
            tracing::info!("shutdown requested, draining in-flight requests");
            let _ = draining_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.map_err(ServerError::from),
        Ok(()) = draining_rx => {}
    }

    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(result) => {
            tracing::info!("server stopped");
            result.map_err(ServerError::from)
        }
        Err(_) => {
            tracing::warn!(?drain_timeout, "drain timed out, cancelling in-flight requests");
            shutdown.cancel();
            Err(ServerError::DrainTimeout(drain_timeout))
        }
    }
}

/// Completes on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!(signal = "SIGINT", "received shutdown signal"),
        () = terminate => tracing::info!(signal = "SIGTERM", "received shutdown signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::get;
    use std::sync::Arc;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpStream,
        sync::Notify,
    };

    async fn listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn test_idle_server_stops_cleanly() {
        let listener = listener().await;
        let addr = listener.local_addr().unwrap();
        let router = Router::new().route("/", get(|| async { "ok" }));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let shutdown = CancellationToken::new();

        let server = tokio::spawn(serve(
            listener,
            router,
            shutdown.clone(),
            Duration::from_secs(5),
            async move {
                let _ = stop_rx.await;
            },
        ));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
        assert!(!shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn test_stuck_request_times_out_and_cancels() {
        let listener = listener().await;
        let addr = listener.local_addr().unwrap();
        let entered = Arc::new(Notify::new());
        let shutdown = CancellationToken::new();
        let router = {
            let entered = entered.clone();
            let shutdown = shutdown.clone();
            Router::new().route(
                "/slow",
                get(move || {
                    let entered = entered.clone();
                    let shutdown = shutdown.clone();
                    async move {
                        entered.notify_one();
                        shutdown.cancelled().await;
                        "cancelled"
                    }
                }),
            )
        };
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve(
            listener,
            router,
            shutdown.clone(),
            Duration::from_millis(100),
            async move {
                let _ = stop_rx.await;
            },
        ));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        entered.notified().await;

        stop_tx.send(()).unwrap();
        let err = server.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            ServerError::DrainTimeout(timeout) if timeout == Duration::from_millis(100)
        ));
        assert!(shutdown.is_cancelled());
    }
}
