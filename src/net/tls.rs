//! TLS configuration and certificate loading.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ServerConfig, SupportedProtocolVersion};

/// Versions offered to clients. Nothing older than TLS 1.2.
pub const PROTOCOL_VERSIONS: &[&SupportedProtocolVersion] =
    &[&rustls::version::TLS12, &rustls::version::TLS13];

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("certificate file not found: {}", .0.display())]
    CertNotFound(PathBuf),

    #[error("private key file not found: {}", .0.display())]
    KeyNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
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

/// Load TLS configuration from PEM certificate and key files.
///
/// TLS 1.2 is the minimum version; ALPN offers h2 then http/1.1.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    if !cert_path.exists() {
        return Err(TlsError::CertNotFound(cert_path.to_path_buf()));
    }
    if !key_path.exists() {
        return Err(TlsError::KeyNotFound(key_path.to_path_buf()));
    }

    let certs = read_certs(cert_path).await?;
    let key = read_key(key_path).await?;

    let mut config = ServerConfig::builder_with_protocol_versions(PROTOCOL_VERSIONS)
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(RustlsConfig::from_config(Arc::new(config)))
}

async fn read_pem(path: &Path) -> Result<Vec<u8>, TlsError> {
    tokio::fs::read(path).await.map_err(|source| TlsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn read_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let pem = read_pem(path).await?;
    let certs = rustls_pemfile::certs(&mut pem.as_slice())
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

async fn read_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let pem = read_pem(path).await?;
    rustls_pemfile::private_key(&mut pem.as_slice())
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("mesh-balancer-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    #[test]
    fn nothing_below_tls12_is_offered() {
        let floor = u16::from(rustls::ProtocolVersion::TLSv1_2);
        assert!(PROTOCOL_VERSIONS
            .iter()
            .all(|v| u16::from(v.version) >= floor));
        assert!(PROTOCOL_VERSIONS
            .iter()
            .any(|v| v.version == rustls::ProtocolVersion::TLSv1_3));
    }

    #[tokio::test]
    async fn valid_pair_builds_server_config() {
        let config = load_tls_config(&fixture("localhost.crt"), &fixture("localhost.key"))
            .await
            .unwrap();
        let inner = config.get_inner();
        assert_eq!(inner.alpn_protocols, vec![b"h2".to_vec(), b"http/1.1".to_vec()]);
    }

    #[tokio::test]
    async fn key_file_without_key_is_rejected() {
        let err = load_tls_config(&fixture("localhost.crt"), &fixture("localhost.crt"))
            .await
            .unwrap_err();
        assert!(matches!(err, TlsError::NoPrivateKey(_)));
    }

    #[tokio::test]
    async fn missing_cert_is_reported_first() {
        let err = load_tls_config(Path::new("/nonexistent/cert.pem"), Path::new("/nonexistent/key.pem"))
            .await
            .unwrap_err();
        assert!(matches!(err, TlsError::CertNotFound(_)));
    }

    #[tokio::test]
    async fn missing_key_is_reported() {
        let cert = scratch("only-cert.pem", "");
        let err = load_tls_config(&cert, Path::new("/nonexistent/key.pem"))
            .await
            .unwrap_err();
        assert!(matches!(err, TlsError::KeyNotFound(_)));
        let _ = std::fs::remove_file(cert);
    }

    #[tokio::test]
    async fn file_without_pem_blocks_has_no_certificates() {
        let cert = scratch("garbage-cert.pem", "not a certificate\n");
        let key = scratch("garbage-key.pem", "not a key\n");
        let err = load_tls_config(&cert, &key).await.unwrap_err();
        assert!(matches!(err, TlsError::NoCertificates(_)));
        let _ = std::fs::remove_file(cert);
        let _ = std::fs::remove_file(key);
    }
}
