//! Swappable serving state: config, catalog and the gate built from them.

use crate::catalog::Catalog;
use crate::config::{GateConfig, cfg, reload_config};
use crate::gate::{AuditSink, LogAudit, RequestGate};
use crate::log;
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use std::fs;
use std::sync::Arc;

/// One generation of serving state. Swapped as a whole on reload.
pub struct Runtime {
    pub config: Arc<GateConfig>,
    pub catalog: Arc<Catalog>,
    pub gate: RequestGate,
    catalog_hash: u64,
}

impl Runtime {
    /// Load the catalog named by `config` and build the gate.
    pub fn build(config: Arc<GateConfig>, audit: Arc<dyn AuditSink>) -> Result<Self> {
        let path = config.catalog_path();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_content(config, &content, audit)
    }

    fn from_content(
        config: Arc<GateConfig>,
        content: &str,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self> {
        let catalog = Arc::new(Catalog::from_str(content).with_context(|| {
            format!("Invalid catalog {}", config.catalog_path().display())
        })?);
        let gate = RequestGate::new(
            config.gate_settings(),
            catalog.clone(),
            catalog.clone(),
            audit,
        );

        Ok(Self {
            catalog_hash: crate::utils::hash::compute(content.as_bytes()),
            config,
            catalog,
            gate,
        })
    }
}

/// Lock-free handle shared by the request pool and the reload worker.
#[derive(Clone)]
pub struct SharedRuntime {
    inner: Arc<ArcSwap<Runtime>>,
    audit: Arc<dyn AuditSink>,
}

impl SharedRuntime {
    pub fn new(runtime: Runtime, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(runtime)),
            audit,
        }
    }

    /// Build the initial runtime from the global config.
    pub fn from_global() -> Result<Self> {
        let audit: Arc<dyn AuditSink> = Arc::new(LogAudit);
        let runtime = Runtime::build(cfg(), audit.clone())?;
        Ok(Self::new(runtime, audit))
    }

    #[inline]
    pub fn load(&self) -> Arc<Runtime> {
        self.inner.load_full()
    }

    /// Pick up config and catalog edits.
    ///
    /// A broken file is reported and the previous runtime keeps serving.
    pub fn poll_reload(&self) {
        let current = self.load();

        let config_changed = if current.config.config_path.is_file() {
            match reload_config() {
                Ok(changed) => changed,
                Err(e) => {
                    log!("reload"; "keeping previous config: {:#}", e);
                    false
                }
            }
        } else {
            false
        };
        let config = if config_changed { cfg() } else { current.config.clone() };

        let content = match fs::read_to_string(config.catalog_path()) {
            Ok(content) => content,
            Err(e) => {
                log!("reload"; "cannot read catalog {}: {}", config.catalog_path().display(), e);
                return;
            }
        };
        let hash = crate::utils::hash::compute(content.as_bytes());
        if !config_changed && hash == current.catalog_hash {
            return;
        }

        match Runtime::from_content(config, &content, self.audit.clone()) {
            Ok(runtime) => {
                log!(
                    "reload";
                    "{} reloaded ({} items)",
                    if config_changed { "config" } else { "catalog" },
                    runtime.catalog.item_count()
                );
                self.inner.store(Arc::new(runtime));
            }
            Err(e) => log!("reload"; "keeping previous catalog: {:#}", e),
        }
    }
}
