//! # Middleware
//!
//! [`JwtMiddleware`] is a component: its `validate` and `refresh` middleware
//! need the login and JWT services. [`logging`] and [`error_handling`] carry no
//! state and are plain functions.

use crate::error::{AuthError, HandlerError};
use crate::http::{handler, middleware, BoxHandler, Middleware, Request, Response, Session};
use crate::jwt::JwtService;
use crate::session::LoginService;
use component_graph::{Component, ConstructError, Dep, Dependencies};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Blueprint for [`JwtMiddleware`]; registered as `JwtMiddleware`.
#[derive(Default)]
pub struct JwtMiddlewareBlueprint {
    login: Dep<LoginService>,
    jwt: Dep<JwtService>,
}

impl Component for JwtMiddlewareBlueprint {
    type Instance = JwtMiddleware;
    const NAME: Option<&'static str> = Some("JwtMiddleware");

    fn dependencies(deps: &mut Dependencies<Self>) {
        deps.named::<LoginService>("LoginService", |bp, login| bp.login.fill(login))
            .named::<JwtService>("JwtService", |bp, jwt| bp.jwt.fill(jwt));
    }

    fn construct(&self) -> Result<JwtMiddleware, ConstructError> {
        Ok(JwtMiddleware {
            login: self.login.get()?,
            jwt: self.jwt.get()?,
        })
    }
}

pub struct JwtMiddleware {
    login: Rc<LoginService>,
    jwt: Rc<JwtService>,
}

impl JwtMiddleware {
    pub fn login_service(&self) -> &Rc<LoginService> {
        &self.login
    }

    pub fn jwt_service(&self) -> &Rc<JwtService> {
        &self.jwt
    }

    /// Checks the request's token and attaches the [`Session`].
    async fn authenticate(&self, request: &Request) -> Result<Session, AuthError> {
        let token = self.login.get_token(request)?.to_string();
        let claims = self.jwt.validate(&token)?;
        if self.login.is_invalid_token(&token).await? {
            return Err(AuthError::Revoked);
        }
        Ok(Session { token, claims })
    }

    /// Answers 401 unless the request carries a valid, unrevoked token.
    ///
    /// Store failures are not authentication failures; they propagate as errors.
    pub fn validate(self: &Rc<Self>) -> Middleware {
        let this = self.clone();
        middleware(move |next| {
            let this = this.clone();
            handler(move |request| {
                let this = this.clone();
                let next = next.clone();
                async move { this.guard(request, &next).await }
            })
        })
    }

    /// Re-issues the session cookie when the token is close to expiry.
    ///
    /// Must run inside [`JwtMiddleware::validate`].
    pub fn refresh(self: &Rc<Self>) -> Middleware {
        let this = self.clone();
        middleware(move |next| {
            let this = this.clone();
            handler(move |request| {
                let this = this.clone();
                let next = next.clone();
                async move { this.renew(request, &next).await }
            })
        })
    }

    async fn guard(&self, request: Request, next: &BoxHandler) -> Result<Response, HandlerError> {
        match self.authenticate(&request).await {
            Ok(session) => next.call(request.with_session(session)).await,
            Err(AuthError::Store(err)) => Err(err.into()),
            Err(err) => {
                warn!(
                    method = %request.method(),
                    path = request.path(),
                    error = %err,
                    "Unauthorized"
                );
                Ok(Response::unauthorized())
            }
        }
    }

    async fn renew(&self, request: Request, next: &BoxHandler) -> Result<Response, HandlerError> {
        let session = request.session().ok_or(HandlerError::MissingSession)?;
        if !self.jwt.needs_refresh(&session.claims) {
            return next.call(request).await;
        }
        let token = self.jwt.issue(&session.claims.name)?;
        debug!(user = %session.claims.name, "Refreshing token");

        let mut response = next.call(request).await?;
        self.login
            .set_token(&mut response, &token, self.jwt.session_timeout());
        Ok(response)
    }
}

/// Logs every request and its status.
pub fn logging() -> Middleware {
    middleware(|next| {
        handler(move |request| {
            let next = next.clone();
            async move { log_request(request, &next).await }
        })
    })
}

/// Turns handler errors into a 500 JSON [`ReturnMessage`](crate::http::ReturnMessage).
pub fn error_handling() -> Middleware {
    middleware(|next| {
        handler(move |request| {
            let next = next.clone();
            async move { recover(request, &next).await }
        })
    })
}

async fn log_request(request: Request, next: &BoxHandler) -> Result<Response, HandlerError> {
    let method = request.method();
    let path = request.path().to_string();
    info!(%method, %path, "Request");
    let result = next.call(request).await;
    if let Ok(response) = &result {
        info!(%method, %path, status = response.status, "Response");
    }
    result
}

async fn recover(request: Request, next: &BoxHandler) -> Result<Response, HandlerError> {
    let method = request.method();
    let path = request.path().to_string();
    match next.call(request).await {
        Ok(response) => Ok(response),
        Err(err) => {
            warn!(%method, %path, error = %err, "Request failed");
            Ok(Response::internal_error(format!("Error: {err}")))
        }
    }
}
