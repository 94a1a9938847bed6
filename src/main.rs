//! Sluice demo server.
//!
//! Serves a small route table through the dispatch engine:
//!
//! ```text
//! GET  /                       greeting
//! GET  /api/users/<id:int>     user lookup (digits only)
//! POST /api/echo               echoes the request body
//! GET  /files/*path            multi-segment wildcard
//! GET  /panic                  exercises the recovery boundary
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use clap::Parser;
use serde::Serialize;
use tokio::net::TcpListener;

use sluice::config::{load_config, SluiceConfig};
use sluice::http::shutdown_signal;
use sluice::middleware::Recovery;
use sluice::observability::{logging, metrics};
use sluice::{chain, Context, Handler, HttpServer, Router};

#[derive(Parser)]
#[command(name = "sluice")]
#[command(about = "HTTP routing engine demo server", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`
    #[arg(short, long)]
    bind: Option<String>,
}

#[derive(Serialize)]
struct User {
    id: u64,
    name: String,
}

fn index(ctx: &mut Context) {
    ctx.text(StatusCode::OK, "sluice\n");
}

fn show_user(ctx: &mut Context) {
    let id = match ctx.params().parse::<u64>("id") {
        Ok(id) => id,
        Err(e) => {
            ctx.text(StatusCode::BAD_REQUEST, e.to_string());
            return;
        }
    };
    let user = User {
        id,
        name: format!("user-{id}"),
    };
    if let Err(e) = ctx.json(StatusCode::OK, &user) {
        tracing::error!(error = %e, "Failed to encode user");
        ctx.abort_with_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}

fn echo(ctx: &mut Context) {
    let body = ctx.body().clone();
    ctx.write_header(StatusCode::OK);
    ctx.write(body);
}

fn serve_file(ctx: &mut Context) {
    let path = ctx.param("path").unwrap_or_default().to_string();
    ctx.text(StatusCode::OK, format!("file: {path}\n"));
}

fn explode(_ctx: &mut Context) {
    panic!("demo panic");
}

fn routes(config: &SluiceConfig) -> Router {
    let mut router = Router::new();
    router.use_middleware([Handler::object(
        Recovery::new().expose_details(config.engine.expose_panic_details),
    )]);

    router.get("/", chain![index]);
    router.group("/api", |api| {
        api.get(r"/users/<id:int ~ \d+>", chain![show_user]);
        api.post("/echo", chain![echo]);
    });
    router.get("/files/*path", chain![serve_file]);
    router.get("/panic", chain![explode]);
    router.not_found(chain![|ctx: &mut Context| {
        ctx.text(StatusCode::NOT_FOUND, "no such route\n")
    }]);
    router
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SluiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sluice starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let engine = routes(&config).build(&config.engine)?;
    for route in engine.routes() {
        tracing::info!(
            method = %route.method,
            path = %route.path,
            handlers = route.handlers,
            "Route"
        );
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(Arc::new(engine), config.server.clone());
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
