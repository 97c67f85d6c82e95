// Connection handling module
// Serves one accepted TCP connection, plain or TLS, per spawned task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsAcceptor;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Holds one slot of the active connection count until dropped
struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    /// Take a slot, or `None` when `limit` connections are already active
    fn acquire(counter: &Arc<AtomicUsize>, limit: Option<u64>) -> Option<Self> {
        // Increment first, then check, so concurrent accepts cannot both pass
        let prev = counter.fetch_add(1, Ordering::SeqCst);
        let slot = Self(Arc::clone(counter));

        match limit {
            Some(max) if prev >= usize::try_from(max).unwrap_or(usize::MAX) => None,
            _ => Some(slot),
        }
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept a connection, enforcing `performance.max_connections`
///
/// With `tls` set the TLS handshake runs first, inside the connection timeout.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    tls: Option<&TlsAcceptor>,
    conn_counter: &Arc<AtomicUsize>,
) {
    let limit = state.config.performance.max_connections;
    let Some(slot) = ConnectionSlot::acquire(conn_counter, limit) else {
        logger::log_connection_rejected(&peer_addr, limit.unwrap_or_default());
        drop(stream);
        return;
    };

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state), tls.cloned(), slot);
}

/// Serve one connection in its own task
///
/// The whole connection is bounded by `max(read_timeout, write_timeout)`.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    tls: Option<TlsAcceptor>,
    slot: ConnectionSlot,
) {
    tokio::spawn(async move {
        let _slot = slot;

        let performance = &state.config.performance;
        let timeout_duration = Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let conn_state = Arc::clone(&state);
        let conn = async move {
            match tls {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(tls_stream) => serve_http(tls_stream, peer_addr, conn_state).await,
                    Err(err) => {
                        logger::log_tls_handshake_failed(&peer_addr, &err);
                        Ok(())
                    }
                },
                None => serve_http(stream, peer_addr, conn_state).await,
            }
        };

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_connection_timeout(&peer_addr),
        }
    });
}

/// Run HTTP/1.1 over a plain or TLS stream
async fn serve_http<I>(io: I, peer_addr: SocketAddr, state: Arc<AppState>) -> hyper::Result<()>
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let mut builder = http1::Builder::new();
    builder.keep_alive(state.config.performance.keep_alive_timeout > 0);

    builder
        .serve_connection(
            TokioIo::new(io),
            service_fn(move |req| handler::handle_request(req, peer_addr, Arc::clone(&state))),
        )
        .await
}
