//! # Graph Sample
//!
//! Builds the login demo and drives one scripted session through its router:
//! log in, open the home page, log out, and try the home page again.
//!
//! ```bash
//! RUST_LOG=info cargo run -p graph-sample -- --user alice
//! RUST_LOG=debug cargo run -p graph-sample -- --config sample.toml
//! ```

use clap::Parser;
use component_graph::tracing::setup_tracing;
use graph_sample::config::AppConfig;
use graph_sample::http::{CookieJar, Request, Router};
use graph_sample::lifecycle::Application;
use std::path::PathBuf;
use tracing::{info, Instrument};

#[derive(Debug, Parser)]
#[command(name = "graph-sample", about = "JWT login demo on a component graph")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Username to log in with
    #[arg(short, long, default_value = "alice")]
    user: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), String> {
    setup_tracing();
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).map_err(|e| e.to_string())?;
    let mut app = Application::new(config).map_err(|e| e.to_string())?;
    let created = app.inject().map_err(|e| e.to_string())?;
    info!(created, "Application ready");

    let router = app.router().map_err(|e| e.to_string())?;
    let mut jar = CookieJar::new();

    let steps = [
        ("login", Request::post("/login").form("username", args.user.clone())),
        ("home", Request::get("/home")),
        ("logout", Request::get("/logout")),
        ("home_after_logout", Request::get("/home")),
    ];
    for (step, request) in steps {
        let span = tracing::info_span!("step", step);
        send(&router, &mut jar, request).instrument(span).await;
    }

    info!("Session finished");
    Ok(())
}

async fn send(router: &Router, jar: &mut CookieJar, request: Request) {
    let path = request.path().to_string();
    let response = router.dispatch(jar.apply(request)).await;
    jar.store(&response);
    info!(%path, status = response.status, body = %response.body.trim(), "Done");
}
