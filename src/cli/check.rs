//! Check command implementation.
//!
//! Resolves one URL through the catalog, runs the gate with an in-memory
//! audit recorder and prints the decision as JSON.

use std::fs;
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::catalog::{Catalog, IncomingRequest};
use crate::cli::args::CheckArgs;
use crate::config::GateConfig;
use crate::gate::{AuditEntry, GateSettings, MemoryAudit, Outcome, RequestGate};
use crate::log;

/// What the gate saw for the checked request.
#[derive(Debug, Serialize)]
pub struct RequestSummary {
    pub site: String,
    pub user: String,
    pub local_path: String,
    pub file_path: String,
    pub permission_denied: bool,
    pub preview: bool,
}

/// JSON document printed by `check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub request: RequestSummary,
    pub outcome: Outcome,
    pub audit: Vec<AuditEntry>,
}

/// Execute check command
pub fn run_check(args: &CheckArgs, config: &GateConfig) -> Result<()> {
    let catalog = Catalog::load(config.catalog_path())
        .with_context(|| format!("Failed to load catalog {}", config.catalog_path().display()))?;

    let report = evaluate(Arc::new(catalog), config.gate_settings(), args)?;

    let formatted = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    if let Some(ref output_path) = args.output {
        let mut file = fs::File::create(output_path)?;
        writeln!(file, "{}", formatted)?;
        log!("check"; "wrote output to {}", output_path.display());
    } else {
        println!("{}", formatted);
    }

    Ok(())
}

/// Run the gate for `args` against `catalog`.
fn evaluate(catalog: Arc<Catalog>, settings: GateSettings, args: &CheckArgs) -> Result<CheckReport> {
    let mut request = IncomingRequest::new(args.url.clone());
    if let Some(host) = &args.host {
        request = request.with_host(host.clone());
    }
    if let Some(user) = &args.user {
        request = request.with_user(user.clone());
    }

    let ctx = catalog.resolve_request(&request);
    let audit = Arc::new(MemoryAudit::new());
    let gate = RequestGate::new(settings, catalog.clone(), catalog, audit.clone());

    let outcome = gate
        .process(&ctx)
        .with_context(|| format!("gate failed for {}", args.url))?;

    Ok(CheckReport {
        request: RequestSummary {
            site: ctx.site_name().to_string(),
            user: ctx.user_name().to_string(),
            local_path: ctx.local_path.clone(),
            file_path: ctx.page.map(|p| p.file_path).unwrap_or_default(),
            permission_denied: ctx.permission_denied,
            preview: ctx.mode.is_preview(),
        },
        outcome,
        audit: audit.take(),
    })
}
