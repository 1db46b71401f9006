//! Shared test helpers for `z_toolchain_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::{Arc, LazyLock};
use z_toolchain_core::{CheckConfig, Checker, Diagnostic, Registry, StructuralValidator};
use z_toolchain_registry::load_registry_from_str;

/// Fixture registry loaded once per test binary via LazyLock.
pub static REGISTRY: LazyLock<Arc<Registry>> = LazyLock::new(|| {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/registry.json");
    let json = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    Arc::new(
        load_registry_from_str(&json)
            .unwrap_or_else(|e| panic!("failed to load {}: {}", path.display(), e)),
    )
});

// ─── Check helpers ───────────────────────────────────────────────────────────

/// Structural diagnostics only, with the default config.
#[allow(dead_code)]
pub fn validate(text: &str) -> Vec<Diagnostic> {
    let config = CheckConfig::default();
    StructuralValidator::new(&REGISTRY, &config).validate(text)
}

/// Full check (structural + markers) with the default config.
#[allow(dead_code)]
pub fn checker() -> Checker {
    Checker::new(Arc::clone(&REGISTRY), CheckConfig::default())
}

/// Diagnostic ids, in order.
#[allow(dead_code)]
pub fn ids(diags: &[Diagnostic]) -> Vec<String> {
    diags.iter().map(|d| d.id.to_string()).collect()
}

/// Find first diagnostic with the given code.
#[allow(dead_code)]
pub fn find_diag<'a>(diags: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    diags
        .iter()
        .find(|d| &*d.id == code)
        .unwrap_or_else(|| panic!("expected diagnostic {code} in {diags:?}"))
}

/// `(line, start character, end character)` of a diagnostic.
#[allow(dead_code)]
pub fn span(d: &Diagnostic) -> (u32, u32, u32) {
    (d.range.start.line, d.range.start.character, d.range.end.character)
}
