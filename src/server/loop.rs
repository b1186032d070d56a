// Server loop module
// Accepts connections until a shutdown signal arrives

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop until shutdown is requested
///
/// Accept errors are logged and the loop keeps running; only the shutdown
/// signal breaks it. In-flight connections finish in their own tasks.
pub async fn run_accept_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    signals: Arc<SignalHandler>,
) {
    loop {
        // Fast path: a signal delivered between loop iterations must not be
        // lost to the Notify race
        if signals.shutdown_requested.load(Ordering::SeqCst) {
            logger::log_shutdown(active_connections.load(Ordering::SeqCst));
            break;
        }

        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = signals.shutdown.notified() => {
                logger::log_shutdown(active_connections.load(Ordering::SeqCst));
                break;
            }
        }
    }
}
