// TLS module
// Optional HTTPS: a PEM certificate chain and private key loaded at startup

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::{self, ServerConfig as RustlsConfig};
use tokio_rustls::TlsAcceptor;

use crate::config::ServerConfig;
use crate::logger;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no certificates found in {}", .0.display())]
    NoCertificates(PathBuf),

    #[error("no private key found in {}", .0.display())]
    NoPrivateKey(PathBuf),

    #[error("invalid TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Build the acceptor for `server.tls_cert`/`server.tls_key`
///
/// Returns `None`, meaning plain HTTP, when neither is set or when loading
/// fails. Failures are logged.
pub fn acceptor_from_config(server: &ServerConfig) -> Option<TlsAcceptor> {
    match (&server.tls_cert, &server.tls_key) {
        (None, None) => None,
        (Some(cert), Some(key)) => match load_tls_acceptor(Path::new(cert), Path::new(key)) {
            Ok(acceptor) => {
                logger::log_info(&format!("[TLS] Loaded certificate chain from {cert}"));
                Some(acceptor)
            }
            Err(e) => {
                logger::log_warning(&format!("[TLS] {e}, falling back to plain HTTP"));
                None
            }
        },
        _ => {
            logger::log_warning(
                "[TLS] server.tls_cert and server.tls_key must be set together, falling back to plain HTTP",
            );
            None
        }
    }
}

/// Load a certificate chain and private key into an HTTP/1.1 acceptor
pub fn load_tls_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, TlsError> {
    let certs = load_certs(cert_path)?;
    let key = load_private_key(key_path)?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = RustlsConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn open_pem(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path).map(BufReader::new).map_err(|source| TlsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut reader = open_pem(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut reader = open_pem(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_path_buf()))
}
