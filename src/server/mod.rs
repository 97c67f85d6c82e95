// Server module entry
// Listener setup, optional TLS, accept loop, per-connection tasks and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;
pub mod tls;

// `loop` is a keyword, so the file is mounted under another name
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;
pub use signal::start_signal_handler;
pub use tls::{acceptor_from_config, load_tls_acceptor, TlsError};
