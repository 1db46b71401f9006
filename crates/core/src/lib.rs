//! Z markup toolchain core library.
//!
//! Checks Z documents against an element registry. The main entry point is
//! [`Checker::check`], which runs the [`StructuralValidator`] and the marker
//! scan and returns every diagnostic in one [`CheckResult`].

#![warn(missing_docs)]

/// Line classification into declaration events.
pub mod classify;
/// Diagnostic accumulation.
pub mod collect;
/// Checker configuration.
pub mod config;
/// Marker substring scan.
pub mod markers;
/// Target outline of a document.
pub mod outline;
/// Registry-driven structural validation.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────

pub use classify::{ChildKind, LineEvent, ParsedElement, classify, classify_code};
pub use collect::DiagnosticCollector;
pub use config::{CheckConfig, CodeBodies, ConfigError, load_config_from_str};
pub use markers::scan_markers;
pub use outline::{TargetDecl, targets};
pub use validate::{AllowedChildren, ContextStack, StructuralValidator, ValidationContext};

pub use z_toolchain_diagnostics::{Diagnostic, Severity, codes};
pub use z_toolchain_registry::{Registry, RegistryError, RegistryLoader};

use serde::Serialize;
use std::sync::Arc;
use z_toolchain_diagnostics::{Position, Range};

/// Outcome of checking one document.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// `true` if no errors were found (warnings are allowed).
    pub ok: bool,
    /// Structural diagnostics followed by marker diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

/// Checks documents. Cheap to share; holds no per-document state.
#[derive(Debug, Clone)]
pub struct Checker {
    registry: Option<Arc<Registry>>,
    unavailable: Option<String>,
    config: CheckConfig,
}

impl Checker {
    /// Checker over an already loaded registry.
    pub fn new(registry: Arc<Registry>, config: CheckConfig) -> Self {
        Self {
            registry: Some(registry),
            unavailable: None,
            config,
        }
    }

    /// Checker without a registry: structural checks are replaced by a
    /// single registry-unavailable warning; the marker scan still runs.
    pub fn without_registry(reason: impl Into<String>, config: CheckConfig) -> Self {
        Self {
            registry: None,
            unavailable: Some(reason.into()),
            config,
        }
    }

    /// Checker backed by `loader`. A load failure is not an error here; it
    /// degrades the checker as in [`Checker::without_registry`].
    pub fn from_loader(loader: &RegistryLoader, config: CheckConfig) -> Self {
        match loader.load() {
            Ok(registry) => Self::new(registry, config),
            Err(err) => Self::without_registry(err.to_string(), config),
        }
    }

    /// The registry in use, if one is loaded.
    pub fn registry(&self) -> Option<&Arc<Registry>> {
        self.registry.as_ref()
    }

    /// The active configuration.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check a full document. Never fails.
    pub fn check(&self, text: &str) -> CheckResult {
        let mut out = DiagnosticCollector::new();

        match &self.registry {
            Some(registry) => {
                out.extend(StructuralValidator::new(registry, &self.config).validate(text));
            }
            None => {
                let reason = self.unavailable.as_deref().unwrap_or("no registry loaded");
                out.push(
                    collect::coded(
                        codes::REGISTRY_UNAVAILABLE,
                        format!("structural checks skipped: {reason}"),
                        Range::empty(Position::new(0, 0)),
                    )
                    .with_context(std::collections::BTreeMap::from([(
                        "reason".to_string(),
                        reason.to_string(),
                    )])),
                );
            }
        }

        out.extend(scan_markers(text, self.config.markers.as_slice()));

        CheckResult {
            ok: !out.has_errors(),
            diagnostics: out.into_diagnostics(),
        }
    }
}
