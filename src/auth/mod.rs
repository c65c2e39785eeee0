use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expected values for `Claims::roles`
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_USER: &str = "USER";

/// How long a freshly issued token stays valid
pub const TOKEN_TTL_HOURS: i64 = 1;

/// Authorization claims carried by a signed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub roles: Vec<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `subject` that expire `ttl` after `now`
    pub fn new(subject: impl Into<String>, roles: Vec<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: subject.into(),
            roles,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// True when at least one of `required` is held
    pub fn has_roles(&self, required: &[&str]) -> bool {
        required
            .iter()
            .any(|want| self.roles.iter().any(|have| have == want))
    }

    pub fn is_admin(&self) -> bool {
        self.has_roles(&[ROLE_ADMIN])
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("private key cannot be empty")]
    MissingPrivateKey,

    #[error("active key id cannot be blank")]
    BlankKeyId,

    #[error("unknown algorithm {0}")]
    UnknownAlgorithm(String),

    #[error("public key lookup cannot be empty")]
    MissingKeyLookup,

    #[error("unrecognized key id {0:?}")]
    UnknownKeyId(String),

    #[error("token is missing the key id header")]
    MissingKeyId,

    #[error("reading key file {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("signing token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("{0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

/// Maps a token's key id to the key that verifies it. Keeping this a function
/// lets the verifying keys rotate without touching the signing side.
pub type KeyLookup = Arc<dyn Fn(&str) -> Result<DecodingKey, AuthError> + Send + Sync>;

/// A lookup that only ever knows the single active key
pub fn simple_key_lookup(active_kid: impl Into<String>, public_key: DecodingKey) -> KeyLookup {
    let active_kid = active_kid.into();
    Arc::new(move |kid: &str| {
        if kid != active_kid {
            return Err(AuthError::UnknownKeyId(kid.to_string()));
        }
        Ok(public_key.clone())
    })
}

/// Issues tokens for claims and recovers claims from tokens
#[derive(Clone)]
pub struct Authenticator {
    private_key: EncodingKey,
    active_kid: String,
    algorithm: Algorithm,
    key_lookup: KeyLookup,
    validation: Validation,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("active_kid", &self.active_kid)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Fails when the private key or lookup is absent, the key id is blank or
    /// the algorithm name is not one jsonwebtoken knows.
    pub fn new(
        private_key: Option<EncodingKey>,
        active_kid: &str,
        algorithm: &str,
        key_lookup: Option<KeyLookup>,
    ) -> Result<Self, AuthError> {
        let private_key = private_key.ok_or(AuthError::MissingPrivateKey)?;

        if active_kid.trim().is_empty() {
            return Err(AuthError::BlankKeyId);
        }

        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| AuthError::UnknownAlgorithm(algorithm.to_string()))?;

        let key_lookup = key_lookup.ok_or(AuthError::MissingKeyLookup)?;

        // Only the configured algorithm is accepted, and expiry is exact
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;

        Ok(Self {
            private_key,
            active_kid: active_kid.to_string(),
            algorithm,
            key_lookup,
            validation,
        })
    }

    /// Load key material from PEM (or raw secret, for HS*) files
    pub fn from_key_files(
        private_key_file: &str,
        public_key_file: &str,
        active_kid: &str,
        algorithm: &str,
    ) -> Result<Self, AuthError> {
        let alg = Algorithm::from_str(algorithm)
            .map_err(|_| AuthError::UnknownAlgorithm(algorithm.to_string()))?;

        let private_pem = read_key_file(private_key_file)?;
        let (private_key, public_key) = match alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => (
                EncodingKey::from_secret(&private_pem),
                DecodingKey::from_secret(&private_pem),
            ),
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512
            | Algorithm::PS256 | Algorithm::PS384 | Algorithm::PS512 => {
                let public_pem = read_key_file(public_key_file)?;
                (
                    EncodingKey::from_rsa_pem(&private_pem).map_err(AuthError::InvalidToken)?,
                    DecodingKey::from_rsa_pem(&public_pem).map_err(AuthError::InvalidToken)?,
                )
            }
            Algorithm::ES256 | Algorithm::ES384 => {
                let public_pem = read_key_file(public_key_file)?;
                (
                    EncodingKey::from_ec_pem(&private_pem).map_err(AuthError::InvalidToken)?,
                    DecodingKey::from_ec_pem(&public_pem).map_err(AuthError::InvalidToken)?,
                )
            }
            Algorithm::EdDSA => {
                let public_pem = read_key_file(public_key_file)?;
                (
                    EncodingKey::from_ed_pem(&private_pem).map_err(AuthError::InvalidToken)?,
                    DecodingKey::from_ed_pem(&public_pem).map_err(AuthError::InvalidToken)?,
                )
            }
        };

        let lookup = simple_key_lookup(active_kid, public_key);
        Self::new(Some(private_key), active_kid, algorithm, Some(lookup))
    }

    /// Sign `claims` with the active key, naming it in the `kid` header
    pub fn generate_token(&self, claims: &Claims) -> Result<String, AuthError> {
        let mut header = Header::new(self.algorithm);
        header.kid = Some(self.active_kid.clone());

        encode(&header, claims, &self.private_key).map_err(AuthError::Signing)
    }

    /// Verify a token's signature, algorithm and expiry and return its claims
    pub fn parse_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(AuthError::InvalidToken)?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = (self.key_lookup)(&kid)?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(AuthError::InvalidToken)?;
        Ok(data.claims)
    }
}

fn read_key_file(path: &str) -> Result<Vec<u8>, AuthError> {
    std::fs::read(path).map_err(|source| AuthError::KeyFile {
        path: path.to_string(),
        source,
    })
}
