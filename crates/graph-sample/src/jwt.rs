//! # JWT Service
//!
//! Signs and validates HS256 session tokens with the secret from [`AppConfig`].
//! The service also owns the session timing: how long an issued token lives and
//! how close to expiry it must get before it is re-issued.

use crate::config::AppConfig;
use crate::error::AuthError;
use component_graph::{Component, ConstructError, Dep, Dependencies};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub name: String,
    /// Expiry as seconds since the Unix epoch
    pub exp: u64,
}

impl Claims {
    /// Claims for `name` expiring `ttl` from now.
    pub fn new(name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            exp: now_secs() + ttl.as_secs(),
        }
    }

    /// Time left before expiry; zero once expired.
    pub fn remaining(&self) -> Duration {
        Duration::from_secs(self.exp.saturating_sub(now_secs()))
    }
}

pub(crate) fn now_secs() -> u64 {
    jsonwebtoken::get_current_timestamp()
}

/// Blueprint for [`JwtService`]; registered as `JwtService`.
#[derive(Default)]
pub struct JwtServiceBlueprint {
    config: Dep<AppConfig>,
}

impl Component for JwtServiceBlueprint {
    type Instance = JwtService;
    const NAME: Option<&'static str> = Some("JwtService");

    fn dependencies(deps: &mut Dependencies<Self>) {
        deps.typed::<AppConfig>(|bp, config| bp.config.fill(config));
    }

    fn construct(&self) -> Result<JwtService, ConstructError> {
        let config = self.config.get()?;
        if config.jwt_secret.is_empty() {
            return Err("jwt_secret must not be empty".into());
        }
        Ok(JwtService::new(config.jwt_secret.as_bytes())
            .with_timing(config.session_timeout(), config.refresh_threshold()))
    }
}

pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    session_timeout: Duration,
    refresh_threshold: Duration,
}

impl JwtService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            session_timeout: Duration::from_secs(30 * 60),
            refresh_threshold: Duration::from_secs(5 * 60),
        }
    }

    pub fn with_timing(mut self, session_timeout: Duration, refresh_threshold: Duration) -> Self {
        self.session_timeout = session_timeout;
        self.refresh_threshold = refresh_threshold;
        self
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    /// Signs fresh claims for `name`, valid for the session timeout.
    pub fn issue(&self, name: &str) -> Result<String, AuthError> {
        self.sign(&Claims::new(name, self.session_timeout))
    }

    /// Whether `claims` expire within the refresh threshold.
    pub fn needs_refresh(&self, claims: &Claims) -> bool {
        claims.remaining() < self.refresh_threshold
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Decodes `token`, checking the signature and expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
