//! Ad-hoc HTTPS: a self-signed certificate generated at startup and kept in
//! memory for the lifetime of the process.

use crate::config::TlsConfig;
use crate::errors::Result;
use axum_server::tls_rustls::RustlsConfig;
use rcgen::{generate_simple_self_signed, CertifiedKey};
use tracing::info;

const FALLBACK_NAME: &str = "localhost";

pub struct SelfSignedCert {
    pub cert_pem: String,
    pub key_pem: String,
}

impl SelfSignedCert {
    pub fn generate(config: &TlsConfig) -> Result<Self> {
        let mut names: Vec<String> = config
            .subject_alt_names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            names.push(FALLBACK_NAME.to_string());
        }

        info!("Generating self-signed certificate for {}", names.join(", "));
        let CertifiedKey { cert, key_pair } = generate_simple_self_signed(names)?;

        Ok(Self {
            cert_pem: cert.pem(),
            key_pem: key_pair.serialize_pem(),
        })
    }

    pub async fn rustls_config(&self) -> Result<RustlsConfig> {
        let config = RustlsConfig::from_pem(
            self.cert_pem.as_bytes().to_vec(),
            self.key_pem.as_bytes().to_vec(),
        )
        .await?;
        Ok(config)
    }
}
