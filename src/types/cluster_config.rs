// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;

/// Client certificate pair used for mutual TLS
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCert {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// How requests authenticate against the API server
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Auth {
    Token(String),
    ClientCert(ClientCert),
    Anonymous,
}

/// Everything needed to talk to one API server. Immutable once resolved.
#[derive(Clone, Debug)]
pub struct ClusterConfig {
    base_url: String,
    ca_cert_path: PathBuf,
    auth: Auth,
    // Keeps a temporary CA file on disk for as long as any clone is alive
    ca_guard: Option<Arc<TempPath>>,
}

impl ClusterConfig {
    pub fn new(base_url: impl Into<String>, ca_cert_path: impl Into<PathBuf>, auth: Auth) -> Self {
        Self {
            base_url: base_url.into(),
            ca_cert_path: ca_cert_path.into(),
            auth,
            ca_guard: None,
        }
    }

    /// Config whose CA certificate lives in a scoped temporary file
    pub fn with_temp_ca(base_url: impl Into<String>, ca_file: TempPath, auth: Auth) -> Self {
        Self {
            base_url: base_url.into(),
            ca_cert_path: ca_file.to_path_buf(),
            auth,
            ca_guard: Some(Arc::new(ca_file)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ca_cert_path(&self) -> &Path {
        &self.ca_cert_path
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn bearer_token(&self) -> Option<&str> {
        match &self.auth {
            Auth::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn client_cert(&self) -> Option<&ClientCert> {
        match &self.auth {
            Auth::ClientCert(cert) => Some(cert),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_token_auth_accessors() {
        let config = ClusterConfig::new(
            "https://10.0.0.1",
            "/tmp/ca.crt",
            Auth::Token("abc".to_string()),
        );

        assert_eq!(config.bearer_token(), Some("abc"));
        assert!(config.client_cert().is_none());
        assert_eq!(config.ca_cert_path(), Path::new("/tmp/ca.crt"));
    }

    #[test]
    fn test_client_cert_auth_accessors() {
        let cert = ClientCert {
            cert_path: PathBuf::from("/certs/client.crt"),
            key_path: PathBuf::from("/certs/client.key"),
        };
        let config = ClusterConfig::new(
            "https://192.168.49.2:8443",
            "/certs/ca.crt",
            Auth::ClientCert(cert.clone()),
        );

        assert!(config.bearer_token().is_none());
        assert_eq!(config.client_cert(), Some(&cert));
    }

    #[test]
    fn test_temp_ca_removed_after_last_clone() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"pem").unwrap();
        let config = ClusterConfig::with_temp_ca(
            "https://1.2.3.4",
            file.into_temp_path(),
            Auth::Anonymous,
        );
        let path = config.ca_cert_path().to_path_buf();
        let copy = config.clone();

        drop(config);
        assert!(path.exists());

        drop(copy);
        assert!(!path.exists());
    }
}
