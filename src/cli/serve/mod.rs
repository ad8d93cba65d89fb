//! HTTP host applying the request gate to every request.
//!
//! | Outcome        | Response                                   |
//! |----------------|--------------------------------------------|
//! | `Serve`        | static file for the request path           |
//! | `RewritePath`  | static file for the rewritten path         |
//! | `Redirect`     | `301` / `302` with `Location`              |
//! | gate error     | `500`                                      |

mod lifecycle;
mod path;
mod response;
mod runtime;

use runtime::{Runtime, SharedRuntime};

use crate::{
    catalog::IncomingRequest,
    config::cfg,
    debug,
    gate::Outcome,
    log,
};
use anyhow::Result;
use crossbeam::channel;
use std::sync::Arc;
use std::time::Duration;
use tiny_http::{Request, Server};

/// Header carrying the authenticated user name.
pub const USER_HEADER: &str = "X-Sitegate-User";

/// Request worker threads.
const WORKER_THREADS: usize = 4;

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    runtime: SharedRuntime,
    shutdown_rx: channel::Receiver<()>,
}

/// Load the catalog and bind the HTTP server without starting the request loop
pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let runtime = SharedRuntime::from_global()?;

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);
    debug!(
        "serve";
        "{} items from {}, static root {}",
        runtime.load().catalog.item_count(),
        config.catalog_path().display(),
        config.static_root().display()
    );

    Ok(BoundServer {
        server,
        runtime,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the request loop (blocking).
    pub fn run(self) -> Result<()> {
        let config = cfg();
        let reloader = lifecycle::spawn_reloader(
            self.runtime.clone(),
            config.serve.reload,
            Duration::from_secs(config.serve.reload_interval),
            self.shutdown_rx,
        );
        run_request_loop(&self.server, &self.runtime)?;
        lifecycle::wait_for_shutdown(reloader);
        Ok(())
    }
}

/// Run the `serve` command.
pub fn serve() -> Result<()> {
    bind_server()?.run()
}

fn run_request_loop(server: &Server, runtime: &SharedRuntime) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(WORKER_THREADS)
        .build()?;

    for request in server.incoming_requests() {
        let runtime = runtime.load();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &runtime) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, runtime: &Runtime) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let incoming = incoming_request(&request);
    let ctx = runtime.catalog.resolve_request(&incoming);
    let root = runtime.config.static_root();

    let outcome = match runtime.gate.process(&ctx) {
        Ok(outcome) => outcome,
        Err(e) => {
            log!("error"; "{} {}: {}", request.method(), request.url(), e);
            return response::respond_error(request, &e.into());
        }
    };
    debug!("serve"; "{} -> {:?}", request.url(), outcome);

    match outcome {
        Outcome::Serve => serve_local(request, &ctx.request_path, root),
        Outcome::RewritePath { path, .. } => serve_local(request, &path, root),
        Outcome::Redirect { url, permanent } => {
            response::respond_redirect(request, &url, permanent)
        }
    }
}

fn serve_local(request: Request, local_path: &str, root: &std::path::Path) -> Result<()> {
    match path::resolve_path(local_path, root) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request, root),
    }
}

/// Pull host, user and target out of the HTTP request.
fn incoming_request(request: &Request) -> IncomingRequest {
    let mut incoming = IncomingRequest::new(request.url());
    for header in request.headers() {
        let field = header.field.as_str().as_str();
        if field.eq_ignore_ascii_case("host") {
            incoming = incoming.with_host(header.value.as_str());
        } else if field.eq_ignore_ascii_case(USER_HEADER) {
            incoming = incoming.with_user(header.value.as_str());
        }
    }
    incoming
}
