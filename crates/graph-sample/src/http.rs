//! # In-Process HTTP Layer
//!
//! Just enough of a request/response model to run the login flow without a
//! network listener. Handlers are async and reference-counted; middleware wraps a
//! handler and returns a new one.
//!
//! ```text
//! compose(error_handling, [logging, validate]) applied to `home`:
//!
//!   error_handling -> logging -> validate -> home
//! ```

use crate::error::HandlerError;
use crate::jwt::Claims;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// The authenticated session attached by the validating middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub claims: Claims,
}

#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    form: HashMap<String, String>,
    cookies: HashMap<String, String>,
    session: Option<Session>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            form: HashMap::new(),
            cookies: HashMap::new(),
            session: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form.get(key).map(String::as_str)
    }

    pub fn cookie_value(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub http_only: bool,
    pub secure: bool,
    /// Seconds; a negative value deletes the cookie on the client.
    pub max_age: Option<i64>,
}

impl Cookie {
    /// An HttpOnly cookie living for `max_age`.
    pub fn session(
        name: impl Into<String>,
        value: impl Into<String>,
        max_age: Duration,
        secure: bool,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            http_only: true,
            secure,
            max_age: Some(i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX)),
        }
    }

    /// A cookie telling the client to drop `name`.
    pub fn expired(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            http_only: false,
            secure: false,
            max_age: Some(-1),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.max_age.is_some_and(|age| age <= 0)
    }

    /// `Set-Cookie` header value.
    pub fn to_header(&self) -> String {
        let mut header = format!("{}={}", self.name, self.value);
        if let Some(age) = self.max_age {
            header.push_str(&format!("; Max-Age={}", age.max(0)));
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

/// JSON body for failures and simple acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnMessage {
    pub status: bool,
    pub message: String,
}

impl ReturnMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    headers: Vec<(String, String)>,
    cookies: Vec<Cookie>,
    pub body: String,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            cookies: Vec::new(),
            body: String::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn unauthorized() -> Self {
        Self::new(401)
    }

    pub fn html(status: u16, body: impl Into<String>) -> Self {
        let mut response = Self::new(status).with_header("Content-Type", "text/html");
        response.body = body.into();
        response
    }

    pub fn json<T: Serialize>(status: u16, body: &T) -> Result<Self, serde_json::Error> {
        let mut response = Self::new(status).with_header("Content-Type", "application/json");
        response.body = serde_json::to_string(body)?;
        Ok(response)
    }

    /// A 500 carrying `message` as a JSON [`ReturnMessage`].
    pub fn internal_error(message: impl Into<String>) -> Self {
        let message = ReturnMessage::error(message);
        Self::json(500, &message).unwrap_or_else(|_| {
            let mut response = Self::new(500);
            response.body = message.message;
            response
        })
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Adds `cookie`, replacing an earlier one with the same name.
    pub fn set_cookie(&mut self, cookie: Cookie) {
        self.cookies.retain(|c| c.name != cookie.name);
        self.cookies.push(cookie);
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn json_body<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[async_trait(?Send)]
pub trait Handler {
    async fn call(&self, request: Request) -> Result<Response, HandlerError>;
}

pub type BoxHandler = Rc<dyn Handler>;

/// Wraps a handler, returning the wrapped one.
pub type Middleware = Rc<dyn Fn(BoxHandler) -> BoxHandler>;

struct FnHandler<F>(F);

#[async_trait(?Send)]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Request) -> Fut + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + 'static,
{
    async fn call(&self, request: Request) -> Result<Response, HandlerError> {
        (self.0)(request).await
    }
}

/// Turns an async closure into a [`BoxHandler`].
pub fn handler<F, Fut>(f: F) -> BoxHandler
where
    F: Fn(Request) -> Fut + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + 'static,
{
    Rc::new(FnHandler(f))
}

pub fn middleware(f: impl Fn(BoxHandler) -> BoxHandler + 'static) -> Middleware {
    Rc::new(f)
}

/// Chains middleware so that `first` is outermost, followed by `rest` in order.
pub fn compose(first: Middleware, rest: impl IntoIterator<Item = Middleware>) -> Middleware {
    rest.into_iter().fold(first, |outer, inner| {
        let chained: Middleware = Rc::new(move |next: BoxHandler| outer(inner(next)));
        chained
    })
}

/// Maps request paths to handlers.
#[derive(Clone, Default)]
pub struct Router {
    routes: HashMap<String, BoxHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: impl Into<String>, handler: BoxHandler) -> Self {
        self.routes.insert(path.into(), handler);
        self
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort();
        paths
    }

    /// Runs the handler for the request path; 404 when there is none.
    ///
    /// Errors that escape the handler chain become a 500.
    pub async fn dispatch(&self, request: Request) -> Response {
        let Some(handler) = self.routes.get(request.path()).cloned() else {
            return Response::not_found();
        };
        let path = request.path().to_string();
        match handler.call(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%path, error = %err, "Unhandled handler error");
                Response::internal_error(format!("Error: {err}"))
            }
        }
    }
}

/// Client-side cookie storage for driving a session through a [`Router`].
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: HashMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the `Set-Cookie`s of `response`.
    pub fn store(&mut self, response: &Response) {
        for cookie in response.cookies() {
            if cookie.is_expired() {
                self.cookies.remove(&cookie.name);
            } else {
                self.cookies.insert(cookie.name.clone(), cookie.value.clone());
            }
        }
    }

    /// Attaches every stored cookie to `request`.
    pub fn apply(&self, request: Request) -> Request {
        self.cookies
            .iter()
            .fold(request, |req, (name, value)| req.cookie(name.clone(), value.clone()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}
