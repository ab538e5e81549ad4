//! # Login Service
//!
//! Session cookie handling and token revocation. Revoked tokens are kept in the
//! [`TokenStore`] registered as `MemoryStore` until they expire.

use crate::config::AppConfig;
use crate::error::{AuthError, StoreError};
use crate::http::{Cookie, Request, Response};
use crate::jwt::Claims;
use crate::store::TokenStore;
use component_graph::{Component, ConstructError, Dep, Dependencies};
use std::rc::Rc;
use std::time::Duration;
use tracing::info;

/// Blueprint for [`LoginService`]; registered as `LoginService`.
#[derive(Default)]
pub struct LoginServiceBlueprint {
    store: Dep<dyn TokenStore>,
    config: Dep<AppConfig>,
}

impl Component for LoginServiceBlueprint {
    type Instance = LoginService;
    const NAME: Option<&'static str> = Some("LoginService");

    fn dependencies(deps: &mut Dependencies<Self>) {
        deps.named::<dyn TokenStore>("MemoryStore", |bp, store| bp.store.fill(store))
            .typed::<AppConfig>(|bp, config| bp.config.fill(config));
    }

    fn construct(&self) -> Result<LoginService, ConstructError> {
        let config = self.config.get()?;
        Ok(LoginService {
            store: self.store.get()?,
            cookie_name: config.cookie_name.clone(),
            secure_cookie: config.secure_cookie,
        })
    }
}

pub struct LoginService {
    store: Rc<dyn TokenStore>,
    cookie_name: String,
    secure_cookie: bool,
}

impl LoginService {
    /// Revokes `token` for the rest of its lifetime.
    pub async fn invalidate_token(&self, claims: &Claims, token: &str) -> Result<(), StoreError> {
        self.store.set(token, claims.remaining()).await?;
        info!(user = %claims.name, "Token revoked");
        Ok(())
    }

    pub async fn is_invalid_token(&self, token: &str) -> Result<bool, StoreError> {
        self.store.contains(token).await
    }

    /// Sets the session cookie on `response`.
    pub fn set_token(&self, response: &mut Response, token: &str, max_age: Duration) {
        response.set_cookie(Cookie::session(
            self.cookie_name.clone(),
            token,
            max_age,
            self.secure_cookie,
        ));
    }

    pub fn clear_token(&self, response: &mut Response) {
        response.set_cookie(Cookie::expired(self.cookie_name.clone()));
    }

    /// Reads the session cookie from `request`.
    pub fn get_token<'r>(&self, request: &'r Request) -> Result<&'r str, AuthError> {
        request
            .cookie_value(&self.cookie_name)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}
