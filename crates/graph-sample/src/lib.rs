//! # Graph Sample
//!
//! A JWT login demo wired entirely through a [`component_graph::Resolver`].
//!
//! ## Components
//!
//! ```text
//! LoginController
//! └── JwtMiddleware
//!     ├── LoginService
//!     │   ├── MemoryStore   (as dyn TokenStore)
//!     │   └── AppConfig
//!     └── JwtService
//!         └── AppConfig
//! ```
//!
//! - **[config]**: [`AppConfig`](config::AppConfig), loaded from TOML.
//! - **[store]**: the [`TokenStore`](store::TokenStore) capability and its in-memory backend.
//! - **[jwt]**: token signing and validation.
//! - **[session]**: session cookies and token revocation.
//! - **[middleware]**: request validation, token refresh, logging, error handling.
//! - **[controller]**: the `/login`, `/logout` and `/home` routes.
//! - **[lifecycle]**: the [`Application`](lifecycle::Application) bootstrap.
//! - **[http]**: the in-process request/response model the routes run on.

pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod jwt;
pub mod lifecycle;
pub mod middleware;
pub mod session;
pub mod store;
