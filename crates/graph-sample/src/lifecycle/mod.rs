//! # Application Lifecycle
//!
//! This module owns the bootstrap of the sample: registering every component,
//! injecting the graph once, and handing out finished components afterwards.
//!
//! ## The Two Phases
//!
//! 1. **Registration** - [`Application::new`] registers the blueprints. Until
//!    [`Application::inject`] runs, any registration can still be replaced
//!    (tests swap the token store this way).
//! 2. **Injection** - `inject` warms the whole graph. Each component is
//!    initialized exactly once, dependencies first. From then on
//!    [`Application::component`] is a plain cache read.
//!
//! ```rust,ignore
//! let mut app = Application::new(AppConfig::default())?;
//! app.inject()?;
//! let router = app.router()?;
//! let response = router.dispatch(Request::get("/home")).await;
//! ```
//!
//! Asking for a component before injection is an error
//! ([`AppError::NotInjected`](crate::error::AppError::NotInjected)) rather than
//! a lazy build. That keeps initialization in one place.

pub mod application;

pub use application::*;
