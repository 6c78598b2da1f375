//! Verification keys for bearer tokens issued by the identity provider.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::service::{Error, Result};

const TRACING_TARGET: &str = "convoforms_server::service::identity";

/// Default clock skew tolerated on `exp` and `nbf`, in seconds.
const DEFAULT_LEEWAY_SECS: u64 = 60;

/// Where bearer token verification keys come from.
///
/// Exactly one of `jwt_secret` and `public_pem_filepath` must be set.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct IdentityConfig {
    /// Shared HS256 secret of the identity provider.
    #[cfg_attr(
        feature = "config",
        arg(long = "identity-jwt-secret", env = "IDENTITY_JWT_SECRET")
    )]
    pub jwt_secret: Option<String>,

    /// PEM-encoded RSA, EC or Ed25519 public key of the identity provider.
    #[cfg_attr(
        feature = "config",
        arg(long = "identity-public-pem-filepath", env = "IDENTITY_PUBLIC_PEM_FILEPATH")
    )]
    pub public_pem_filepath: Option<PathBuf>,

    /// Required `iss` claim, if any.
    #[cfg_attr(feature = "config", arg(long = "identity-issuer", env = "IDENTITY_ISSUER"))]
    pub issuer: Option<String>,

    /// Required `aud` claim, if any.
    #[cfg_attr(
        feature = "config",
        arg(long = "identity-audience", env = "IDENTITY_AUDIENCE")
    )]
    pub audience: Option<String>,

    /// Clock skew tolerated when checking expiry, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "identity-leeway-secs", env = "IDENTITY_LEEWAY_SECS", default_value_t = DEFAULT_LEEWAY_SECS)
    )]
    pub leeway_secs: u64,
}

impl IdentityConfig {
    /// Config verifying HS256 tokens signed with `secret`.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// Config verifying tokens against the public key at `path`.
    pub fn with_public_pem(path: impl Into<PathBuf>) -> Self {
        Self {
            public_pem_filepath: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        match (&self.jwt_secret, &self.public_pem_filepath) {
            (None, None) => Err(Error::config(
                "Set either IDENTITY_JWT_SECRET or IDENTITY_PUBLIC_PEM_FILEPATH",
            )),
            (Some(_), Some(_)) => Err(Error::config(
                "IDENTITY_JWT_SECRET and IDENTITY_PUBLIC_PEM_FILEPATH are mutually exclusive",
            )),
            (Some(secret), None) if secret.len() < 32 => Err(Error::config(
                "IDENTITY_JWT_SECRET must be at least 32 bytes long",
            )),
            _ => Ok(()),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            public_pem_filepath: None,
            issuer: None,
            audience: None,
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("public_pem_filepath", &self.public_pem_filepath)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

/// Decoding key and validation rules for bearer tokens.
#[derive(Clone)]
pub struct IdentityKeys {
    inner: Arc<IdentityKeysInner>,
}

struct IdentityKeysInner {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityKeys {
    /// Loads keys as described by `config`, reading the PEM file if one is set.
    pub async fn from_config(config: &IdentityConfig) -> Result<Self> {
        config.validate()?;

        let (decoding_key, algorithms) = match (&config.jwt_secret, &config.public_pem_filepath) {
            (Some(secret), _) => (
                DecodingKey::from_secret(secret.as_bytes()),
                vec![Algorithm::HS256],
            ),
            (None, Some(path)) => Self::load_public_pem(path).await?,
            (None, None) => return Err(Error::config("No identity key configured")),
        };

        let keys = Self::new(decoding_key, algorithms, config);
        tracing::info!(
            target: TRACING_TARGET,
            algorithms = ?keys.inner.validation.algorithms,
            issuer = ?config.issuer,
            audience = ?config.audience,
            "identity keys loaded"
        );

        Ok(keys)
    }

    /// Keys verifying HS256 tokens signed with `secret`, with default rules.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(
            DecodingKey::from_secret(secret),
            vec![Algorithm::HS256],
            &IdentityConfig::default(),
        )
    }

    fn new(decoding_key: DecodingKey, algorithms: Vec<Algorithm>, config: &IdentityConfig) -> Self {
        let mut validation = Validation::default();
        validation.algorithms = algorithms;
        validation.leeway = config.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            inner: Arc::new(IdentityKeysInner {
                decoding_key,
                validation,
            }),
        }
    }

    async fn load_public_pem(path: &Path) -> Result<(DecodingKey, Vec<Algorithm>)> {
        let pem = tokio::fs::read(path).await.map_err(|e| {
            Error::file_system(format!("Cannot read public key {}", path.display()))
                .with_source(e)
        })?;

        if let Ok(key) = DecodingKey::from_rsa_pem(&pem) {
            return Ok((
                key,
                vec![
                    Algorithm::RS256,
                    Algorithm::RS384,
                    Algorithm::RS512,
                    Algorithm::PS256,
                    Algorithm::PS384,
                    Algorithm::PS512,
                ],
            ));
        }

        if let Ok(key) = DecodingKey::from_ec_pem(&pem) {
            return Ok((key, vec![Algorithm::ES256, Algorithm::ES384]));
        }

        DecodingKey::from_ed_pem(&pem)
            .map(|key| (key, vec![Algorithm::EdDSA]))
            .map_err(|e| {
                Error::auth(format!(
                    "{} is not an RSA, EC or Ed25519 public key",
                    path.display()
                ))
                .with_source(e)
            })
    }

    /// Verifies `token` and decodes its claims.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> jsonwebtoken::errors::Result<T> {
        let TokenData { claims, .. } =
            jsonwebtoken::decode::<T>(token, &self.inner.decoding_key, &self.inner.validation)?;
        Ok(claims)
    }
}

impl fmt::Debug for IdentityKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityKeys")
            .field("algorithms", &self.inner.validation.algorithms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::ErrorKind;

    const SECRET: &str = "an-hs256-secret-that-is-long-enough";

    #[derive(Debug, Serialize, Deserialize)]
    struct Claims {
        sub: String,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        iss: Option<String>,
    }

    fn token(secret: &str, exp: i64, iss: Option<&str>) -> String {
        let claims = Claims {
            sub: "user_1".to_owned(),
            exp,
            iss: iss.map(str::to_owned),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> i64 {
        jiff::Timestamp::now().as_second() + 3600
    }

    #[test]
    fn config_requires_exactly_one_key() {
        assert!(IdentityConfig::default().validate().is_err());
        assert!(IdentityConfig::with_secret("short").validate().is_err());
        assert!(IdentityConfig::with_secret(SECRET).validate().is_ok());

        let both = IdentityConfig {
            public_pem_filepath: Some("public.pem".into()),
            ..IdentityConfig::with_secret(SECRET)
        };
        assert!(both.validate().is_err());
    }

    #[test]
    fn debug_hides_the_secret() {
        let debug = format!("{:?}", IdentityConfig::with_secret(SECRET));
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("REDACTED"));
    }

    #[tokio::test]
    async fn decodes_hs256_tokens() {
        let keys = IdentityKeys::from_config(&IdentityConfig::with_secret(SECRET))
            .await
            .unwrap();

        let claims: Claims = keys.decode(&token(SECRET, in_one_hour(), None)).unwrap();
        assert_eq!(claims.sub, "user_1");

        assert!(keys.decode::<Claims>(&token("another-secret-of-enough-length!!", in_one_hour(), None)).is_err());
        assert!(keys.decode::<Claims>(&token(SECRET, 1_000, None)).is_err());
    }

    #[tokio::test]
    async fn enforces_issuer() {
        let config = IdentityConfig {
            issuer: Some("https://auth.convoforms.com".to_owned()),
            ..IdentityConfig::with_secret(SECRET)
        };
        let keys = IdentityKeys::from_config(&config).await.unwrap();

        let trusted = token(SECRET, in_one_hour(), Some("https://auth.convoforms.com"));
        assert!(keys.decode::<Claims>(&trusted).is_ok());

        let untrusted = token(SECRET, in_one_hour(), Some("https://evil.example"));
        assert!(keys.decode::<Claims>(&untrusted).is_err());
    }

    #[tokio::test]
    async fn missing_pem_file() {
        let error = IdentityKeys::from_config(&IdentityConfig::with_public_pem(
            "/nonexistent/public.pem",
        ))
        .await
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FileSystem);
    }

    #[tokio::test]
    async fn rejects_garbage_pem() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"-----BEGIN PUBLIC KEY-----\nnope\n-----END PUBLIC KEY-----\n")
            .unwrap();

        let error = IdentityKeys::from_config(&IdentityConfig::with_public_pem(file.path()))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Auth);
    }
}
