//! Logger module
//!
//! Provides logging utilities for the calendar server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Level-gated info and debug output
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Whether messages at `level` pass the configured threshold
///
/// Before `init()` everything up to `Info` is printed.
fn enabled(level: Level) -> bool {
    let threshold = writer::get().map_or(Level::Info, writer::LogWriter::level);
    level <= threshold
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, tls: bool) {
    if !enabled(Level::Info) {
        return;
    }
    write_info("======================================");
    write_info("Calendar server started successfully");
    let scheme = if tls { "https" } else { "http" };
    write_info(&format!("Listening on: {scheme}://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info(&format!("Public dir: {}", config.http.public_dir));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_store_opened(path: &Path, events: usize) {
    log_info(&format!("[Store] Loaded {events} events from {}", path.display()));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_rejected(peer_addr: &SocketAddr, limit: u64) {
    log_warning(&format!(
        "[Connection] Rejected {peer_addr}: limit of {limit} connections reached"
    ));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_tls_handshake_failed(peer_addr: &SocketAddr, err: &impl std::fmt::Display) {
    log_debug(&format!("[TLS] Handshake with {peer_addr} failed: {err}"));
}

pub fn log_connection_timeout(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Timed out: {peer_addr}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_api_error(message: &str) {
    write_error(&format!("[API ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(message);
    }
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    if let Some(w) = writer::get() {
        w.write_access(&entry.format(format));
    } else {
        println!("{}", entry.format(format));
    }
}

pub fn log_api_request(method: &str, path: &str, status: u16) {
    log_debug(&format!("[API] {method} {path} - {status}"));
}

pub fn log_shutdown(signal: &str) {
    log_info(&format!("\n[Shutdown] Received {signal}, no longer accepting connections"));
}
