//! # Observability & Tracing
//!
//! The resolver logs through the `tracing` crate with structured fields. Call
//! [`setup_tracing`] once at process start to install a subscriber.
//!
//! ## What Gets Traced
//!
//! - **Registration**: one `DEBUG` line per descriptor (`component`, `slots`)
//! - **Resolution**: a span per `get` call, `DEBUG` for cache hits and wiring,
//!   `INFO` when a component is initialized
//! - **Failures**: one `WARN` at the frame where resolution broke (missing
//!   registration, cycle, type mismatch, failed initializer)
//!
//! ## Usage
//!
//! ```bash
//! # Initialization order only
//! RUST_LOG=info cargo run
//!
//! # Every registration, cache hit and wired slot
//! RUST_LOG=debug cargo run
//!
//! # Resolver only
//! RUST_LOG=component_graph=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a cold `get("LoginController")` reads leaf-first:
//!
//! ```text
//! INFO get: Initialized component="MemoryStore" slots=0
//! INFO get: Initialized component="AppConfig" slots=0
//! INFO get: Initialized component="LoginService" slots=2
//! INFO get: Initialized component="JwtService" slots=1
//! INFO get: Initialized component="JwtMiddleware" slots=2
//! INFO get: Initialized component="LoginController" slots=1
//! ```

/// Installs the global compact subscriber, filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
