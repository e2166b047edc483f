// # Client TLS Configuration
//
// Assembles a client TLS configuration from a `TlsConfig` record.
//
// ## Behaviour
//
// 1. The protocol floor defaults to TLS 1.0; callers that need a higher
//    floor raise it with `set_min_version` after construction
// 2. Cert and key are loaded only when both paths are set
// 3. A CA file, when set, becomes the root pool and must hold at least
//    one certificate
// 4. `skip_verify` is carried as-is
// 5. `enabled` is left to the caller
//
// File reads are synchronous; this is not meant for hot paths.
//
// ## Usage
//
// ```rust,ignore
// use agentkit_core::TlsConfig;
// use agentkit_tls::build_client_config;
//
// let config = TlsConfig::from_env("AGENT_TLS_")?;
// if config.enabled {
//     let tls = build_client_config(&config)?;
//     let rustls_config = tls.into_rustls()?;
// }
// ```

use std::fs;
use std::io::BufReader;
use std::sync::Arc;

use agentkit_core::{Error, Result, TlsConfig};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, ring};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, RootCertStore, SignatureScheme};
use tracing::{debug, warn};

/// TLS protocol versions, ordered oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TlsVersion {
    Tls10,
    Tls11,
    Tls12,
    Tls13,
}

/// A client certificate chain with its private key
#[derive(Debug)]
pub struct ClientCertificate {
    /// Leaf first, followed by any intermediates
    pub chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl ClientCertificate {
    /// The private key matching the leaf certificate
    pub fn key(&self) -> &PrivateKeyDer<'static> {
        &self.key
    }
}

/// Assembled client TLS settings
#[derive(Debug)]
pub struct ClientTlsConfig {
    min_version: TlsVersion,
    insecure_skip_verify: bool,
    certificates: Vec<ClientCertificate>,
    root_cas: Option<RootCertStore>,
}

impl ClientTlsConfig {
    /// Lowest protocol version the client will accept
    pub fn min_version(&self) -> TlsVersion {
        self.min_version
    }

    /// Raise or lower the protocol floor
    pub fn set_min_version(&mut self, version: TlsVersion) {
        self.min_version = version;
    }

    /// Whether server certificates go unchecked
    pub fn insecure_skip_verify(&self) -> bool {
        self.insecure_skip_verify
    }

    /// Client certificates presented to servers (at most one)
    pub fn certificates(&self) -> &[ClientCertificate] {
        &self.certificates
    }

    /// Root CA pool, if one was configured
    pub fn root_cas(&self) -> Option<&RootCertStore> {
        self.root_cas.as_ref()
    }

    /// Convert into a rustls client configuration
    ///
    /// Every protocol version rustls implements at or above the floor is
    /// enabled. rustls has no TLS 1.0/1.1, so those floors yield 1.2 + 1.3.
    /// Without a CA pool the root store is empty.
    pub fn into_rustls(self) -> Result<rustls::ClientConfig> {
        let provider = Arc::new(ring::default_provider());

        let versions: Vec<&'static rustls::SupportedProtocolVersion> = [
            (TlsVersion::Tls12, &rustls::version::TLS12),
            (TlsVersion::Tls13, &rustls::version::TLS13),
        ]
        .into_iter()
        .filter(|(version, _)| *version >= self.min_version)
        .map(|(_, supported)| supported)
        .collect();

        let builder = rustls::ClientConfig::builder_with_provider(provider.clone())
            .with_protocol_versions(&versions)
            .map_err(|e| Error::config(format!("unsupported TLS versions: {e}")))?;

        let builder = if self.insecure_skip_verify {
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(SkipServerVerification(provider)))
        } else {
            builder.with_root_certificates(self.root_cas.unwrap_or_else(RootCertStore::empty))
        };

        match self.certificates.into_iter().next() {
            Some(cert) => builder
                .with_client_auth_cert(cert.chain, cert.key)
                .map_err(|e| Error::decode(format!("invalid client certificate: {e}"))),
            None => Ok(builder.with_no_client_auth()),
        }
    }
}

/// Build a client TLS configuration from file paths
///
/// # Errors
///
/// - `Io` when a cert, key, or CA file cannot be read (names the path)
/// - `Decode` when the keypair is unusable or the CA file holds no
///   certificate
pub fn build_client_config(config: &TlsConfig) -> Result<ClientTlsConfig> {
    let mut certificates = Vec::new();
    if config.has_client_cert() {
        certificates.push(load_key_pair(&config.cert_file, &config.key_file)?);
        debug!(cert = %config.cert_file, "Loaded client certificate");
    }

    let root_cas = if config.ca_file.is_empty() {
        None
    } else {
        let store = load_ca_pool(&config.ca_file)?;
        debug!(ca = %config.ca_file, roots = store.len(), "Loaded CA pool");
        Some(store)
    };

    if config.skip_verify {
        warn!("Server certificate verification is disabled");
    }

    Ok(ClientTlsConfig {
        min_version: TlsVersion::Tls10,
        insecure_skip_verify: config.skip_verify,
        certificates,
        root_cas,
    })
}

fn read_file(path: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

fn parse_certs(pem: &[u8]) -> Vec<CertificateDer<'static>> {
    rustls_pemfile::certs(&mut BufReader::new(pem))
        .filter_map(|cert| cert.ok())
        .collect()
}

fn load_key_pair(cert_file: &str, key_file: &str) -> Result<ClientCertificate> {
    let chain = parse_certs(&read_file(cert_file)?);
    if chain.is_empty() {
        return Err(Error::decode(format!("no certificate found in {cert_file}")));
    }

    let key_pem = read_file(key_file)?;
    let key = rustls_pemfile::private_key(&mut BufReader::new(key_pem.as_slice()))
        .map_err(|e| Error::decode(format!("failed to parse private key in {key_file}: {e}")))?
        .ok_or_else(|| Error::decode(format!("no private key found in {key_file}")))?;

    ring::sign::any_supported_type(&key)
        .map_err(|e| Error::decode(format!("unsupported private key in {key_file}: {e}")))?;

    Ok(ClientCertificate { chain, key })
}

fn load_ca_pool(ca_file: &str) -> Result<RootCertStore> {
    let certs = parse_certs(&read_file(ca_file)?);

    let mut store = RootCertStore::empty();
    let (added, ignored) = store.add_parsable_certificates(certs);
    if added == 0 {
        return Err(Error::decode(format!(
            "failed to append CA certificate from {ca_file}"
        )));
    }
    if ignored > 0 {
        debug!(ca = %ca_file, ignored, "Skipped unusable CA certificates");
    }

    Ok(store)
}

/// Accepts any server certificate but still checks handshake signatures
#[derive(Debug)]
struct SkipServerVerification(Arc<CryptoProvider>);

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
