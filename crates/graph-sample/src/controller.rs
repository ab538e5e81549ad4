//! # Login Controller
//!
//! The top of the sample graph. Its initializer builds the [`Router`] with the
//! middleware chains of every route:
//!
//! | Path      | Chain                                              |
//! |-----------|----------------------------------------------------|
//! | `/home`   | error handling, logging, validate, refresh         |
//! | `/login`  | error handling, logging                            |
//! | `/logout` | error handling, validate                           |

use crate::error::HandlerError;
use crate::http::{compose, handler, BoxHandler, Method, Request, Response, ReturnMessage, Router};
use crate::middleware::{error_handling, logging, JwtMiddleware, JwtMiddlewareBlueprint};
use component_graph::{Component, ConstructError, Dep, Dependencies};
use std::future::Future;
use std::rc::Rc;
use tracing::info;

/// Blueprint for [`LoginController`]; registered as `LoginController`.
#[derive(Default)]
pub struct LoginControllerBlueprint {
    middleware: Dep<JwtMiddleware>,
}

impl Component for LoginControllerBlueprint {
    type Instance = LoginController;
    const NAME: Option<&'static str> = Some("LoginController");

    fn dependencies(deps: &mut Dependencies<Self>) {
        deps.typed::<JwtMiddlewareBlueprint>(|bp, middleware| bp.middleware.fill(middleware));
    }

    fn construct(&self) -> Result<LoginController, ConstructError> {
        let jwt = self.middleware.get()?;

        let home = compose(error_handling(), [logging(), jwt.validate(), jwt.refresh()]);
        let login = compose(error_handling(), [logging()]);
        let logout = compose(error_handling(), [jwt.validate()]);

        let router = Router::new()
            .route("/home", home(handler(handle_home)))
            .route("/login", login(endpoint(&jwt, handle_login)))
            .route("/logout", logout(endpoint(&jwt, handle_logout)));

        Ok(LoginController { jwt, router })
    }
}

pub struct LoginController {
    jwt: Rc<JwtMiddleware>,
    router: Router,
}

impl LoginController {
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn middleware(&self) -> &Rc<JwtMiddleware> {
        &self.jwt
    }
}

/// Binds a handler function to the middleware component.
fn endpoint<F, Fut>(jwt: &Rc<JwtMiddleware>, f: F) -> BoxHandler
where
    F: Fn(Rc<JwtMiddleware>, Request) -> Fut + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + 'static,
{
    let jwt = jwt.clone();
    handler(move |request| f(jwt.clone(), request))
}

const WELCOME_PAGE: &str = "
  <html>
    <body>
      <h1>Welcome home</h1>
    </body>
  </html>";

async fn handle_home(_request: Request) -> Result<Response, HandlerError> {
    Ok(Response::html(200, WELCOME_PAGE))
}

async fn handle_login(jwt: Rc<JwtMiddleware>, request: Request) -> Result<Response, HandlerError> {
    if request.method() != Method::Post {
        let message = ReturnMessage::error(format!(
            "invalid HTTP method, expected: {}, actual: {}",
            Method::Post,
            request.method()
        ));
        return Ok(Response::json(200, &message)?);
    }

    let username = request.form_value("username").unwrap_or_default();
    if username.is_empty() {
        return Ok(Response::json(200, &ReturnMessage::error("username is empty"))?);
    }

    let service = jwt.jwt_service();
    let token = service.issue(username)?;
    let mut response = Response::json(200, &ReturnMessage::ok(format!("logged in as {username}")))?;
    jwt.login_service()
        .set_token(&mut response, &token, service.session_timeout());
    info!(user = username, "Logged in");
    Ok(response)
}

async fn handle_logout(jwt: Rc<JwtMiddleware>, request: Request) -> Result<Response, HandlerError> {
    let session = request.session().ok_or(HandlerError::MissingSession)?;
    let login = jwt.login_service();
    login.invalidate_token(&session.claims, &session.token).await?;

    let mut response = Response::ok();
    login.clear_token(&mut response);
    info!(user = %session.claims.name, "Logged out");
    Ok(response)
}
