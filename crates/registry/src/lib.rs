//! Element registry for the Z markup language.
//!
//! The registry is the schema the structural validator checks documents
//! against: which **targets** (compilation destinations) may appear at the top
//! level, which **namespaces** (organizational groupings) exist, which kinds
//! may nest inside which, and whether a body is markup or embedded code.
//!
//! Registries are deserialized from a JSON (or JSONC) document with
//! [`load_registry_from_str`], or located on disk through a
//! [`RegistryLoader`] that falls back to the copy embedded at build time.

#![warn(missing_docs)]

mod loader;

pub use loader::{RegistryLoader, RegistrySource, embedded_registry_json};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Wildcard entry in an `allowedChildren` list: any keyword is accepted.
pub const WILDCARD: &str = "*";

/// Errors that can occur when loading or validating a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// JSON deserialization failed.
    #[error("invalid registry JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A registry entry violates a structural rule.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Dotted path of the offending entry (e.g. `targets.next.allowedChildren`).
        field: String,
        /// Why the entry is invalid.
        reason: String,
    },

    /// A registry file exists but could not be read.
    #[error("failed to read registry {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// None of the candidate locations produced a usable registry.
    #[error("no registry could be loaded (tried: {})", .tried.join(", "))]
    Unavailable {
        /// Human-readable description of every candidate that was tried.
        tried: Vec<String>,
    },
}

/// Parse mode of an element body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Body contains nested Z elements.
    #[default]
    Markup,
    /// Body contains embedded target-language code.
    Code,
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseMode::Markup => write!(f, "markup"),
            ParseMode::Code => write!(f, "code"),
        }
    }
}

/// Declaration of the literal root marker keyword (e.g. `project`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RootMarker {
    /// The keyword that opens a multi-target root block.
    pub keyword: String,
    /// Optional human description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A registered target kind: a top-level compilation destination.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetEntry {
    /// Human description, shown by tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parse mode of the target's body.
    #[serde(default)]
    pub mode: ParseMode,
    /// Keywords allowed directly inside the target (may contain [`WILDCARD`]).
    #[serde(default)]
    pub allowed_children: Vec<String>,
    /// Packages installed by generated projects. Not used by validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_packages: Vec<String>,
    /// Compiler identifier for code generation. Not used by validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
}

/// A registered namespace kind: an organizational grouping inside a target.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceEntry {
    /// Output location or tag this namespace maps to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
    /// Kind of the children (e.g. `route`, `component`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_type: Option<String>,
    /// Parse mode of generated children. Informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_mode: Option<ParseMode>,
    /// Keywords allowed directly inside the namespace. `None` means the
    /// namespace declares no restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_children: Option<Vec<String>>,
    /// Scaffolding metadata consumed by file generation. Not used by validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaffold: Option<serde_json::Value>,
}

/// What a registry name refers to.
#[derive(Debug, Clone, Copy)]
pub enum Kind<'a> {
    /// A registered target.
    Target(&'a TargetEntry),
    /// A registered namespace.
    Namespace(&'a NamespaceEntry),
}

/// An `allowedChildren` entry that names no known kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    /// Dotted path of the list holding the entry (e.g. `namespaces.Backend`).
    pub owner: String,
    /// The unknown child name.
    pub child: String,
}

/// The element registry.
///
/// Immutable once loaded. Lookups are O(log n); the list of valid root
/// keywords is computed lazily and cached because every unknown-root
/// diagnostic prints it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    /// Optional root marker declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<RootMarker>,
    /// Target kinds by name.
    pub targets: BTreeMap<String, TargetEntry>,
    /// Namespace kinds by name.
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceEntry>,

    /// Cached root marker + target names (lazily initialized).
    #[serde(skip)]
    valid_roots_cache: OnceLock<Vec<String>>,
}

impl Registry {
    /// Create a registry from its parts. Caches are initialized lazily.
    pub fn new(
        root: Option<RootMarker>,
        targets: BTreeMap<String, TargetEntry>,
        namespaces: BTreeMap<String, NamespaceEntry>,
    ) -> Self {
        Self {
            root,
            targets,
            namespaces,
            valid_roots_cache: OnceLock::new(),
        }
    }

    /// Look up a target by name.
    pub fn target(&self, name: &str) -> Option<&TargetEntry> {
        self.targets.get(name)
    }

    /// Look up a namespace by name.
    pub fn namespace(&self, name: &str) -> Option<&NamespaceEntry> {
        self.namespaces.get(name)
    }

    /// Resolve a name to its kind. Targets shadow namespaces of the same name.
    pub fn kind(&self, name: &str) -> Option<Kind<'_>> {
        self.target(name)
            .map(Kind::Target)
            .or_else(|| self.namespace(name).map(Kind::Namespace))
    }

    /// The root marker keyword, if the registry supports one.
    pub fn root_keyword(&self) -> Option<&str> {
        self.root.as_ref().map(|r| r.keyword.as_str())
    }

    /// `true` if `keyword` is the declared root marker.
    pub fn is_root_marker(&self, keyword: &str) -> bool {
        self.root_keyword() == Some(keyword)
    }

    /// `true` if `keyword` is valid at the top level of a document.
    pub fn is_valid_root(&self, keyword: &str) -> bool {
        self.is_root_marker(keyword) || self.targets.contains_key(keyword)
    }

    /// Every keyword valid at the top level: the root marker (if any)
    /// followed by every target name in sorted order.
    pub fn valid_roots(&self) -> &[String] {
        self.valid_roots_cache.get_or_init(|| {
            self.root_keyword()
                .map(str::to_string)
                .into_iter()
                .chain(self.targets.keys().cloned())
                .collect()
        })
    }

    /// Iterate over target names in sorted order.
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// `true` if `name` is a registered target or namespace.
    pub fn is_known_kind(&self, name: &str) -> bool {
        self.kind(name).is_some()
    }

    /// List `allowedChildren` entries that name neither a target nor a
    /// namespace. Such entries never match anything; validation tolerates
    /// them, tooling reports them.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let targets = self
            .targets
            .iter()
            .map(|(name, t)| (format!("targets.{name}"), t.allowed_children.as_slice()));
        let namespaces = self.namespaces.iter().filter_map(|(name, ns)| {
            ns.allowed_children
                .as_deref()
                .map(|children| (format!("namespaces.{name}"), children))
        });

        targets
            .chain(namespaces)
            .flat_map(|(owner, children)| {
                children
                    .iter()
                    .filter(|c| c.as_str() != WILDCARD && !self.is_known_kind(c))
                    .map(move |c| DanglingReference {
                        owner: owner.clone(),
                        child: c.clone(),
                    })
            })
            .collect()
    }
}

/// `true` if `s` matches `^[A-Za-z][A-Za-z0-9_-]*$`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Load and validate a [`Registry`] from a JSON or JSONC string.
///
/// Comments and trailing commas are accepted. Performs structural validation
/// after deserialization:
/// - at least one target must be declared
/// - every target and namespace name must be an identifier
/// - the root keyword (if any) must be an identifier and must not collide
///   with a target or namespace name
/// - `allowedChildren` entries must be non-empty
///
/// Entries naming unknown kinds are **not** rejected; see
/// [`Registry::dangling_references`].
pub fn load_registry_from_str(s: &str) -> Result<Registry, RegistryError> {
    let registry: Registry = serde_json::from_str(&z_toolchain_jsonc_strip::strip_jsonc(s))?;

    if registry.targets.is_empty() {
        return Err(RegistryError::InvalidField {
            field: "targets".into(),
            reason: "must declare at least one target".into(),
        });
    }

    let names = registry
        .targets
        .keys()
        .map(|n| ("targets", n))
        .chain(registry.namespaces.keys().map(|n| ("namespaces", n)));
    for (section, name) in names {
        if !is_identifier(name) {
            return Err(RegistryError::InvalidField {
                field: format!("{section}.{name}"),
                reason: "name must start with a letter and contain only letters, digits, '_' or '-'"
                    .into(),
            });
        }
    }

    if let Some(root) = &registry.root {
        if !is_identifier(&root.keyword) {
            return Err(RegistryError::InvalidField {
                field: "root.keyword".into(),
                reason: format!("'{}' is not a valid identifier", root.keyword),
            });
        }
        if registry.is_known_kind(&root.keyword) {
            return Err(RegistryError::InvalidField {
                field: "root.keyword".into(),
                reason: format!(
                    "'{}' collides with a registered target or namespace",
                    root.keyword
                ),
            });
        }
    }

    let lists = registry
        .targets
        .iter()
        .map(|(n, t)| (format!("targets.{n}"), Some(&t.allowed_children)))
        .chain(
            registry
                .namespaces
                .iter()
                .map(|(n, ns)| (format!("namespaces.{n}"), ns.allowed_children.as_ref())),
        );
    for (owner, children) in lists {
        if children.is_some_and(|c| c.iter().any(|child| child.trim().is_empty())) {
            return Err(RegistryError::InvalidField {
                field: format!("{owner}.allowedChildren"),
                reason: "entries must not be empty".into(),
            });
        }
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{ "targets": { "next": { "allowedChildren": ["Routes"] } } }"#;

    fn sample() -> Registry {
        load_registry_from_str(
            r#"{
              // root marker is optional
              "root": { "keyword": "project" },
              "targets": {
                "next": { "mode": "markup", "allowedChildren": ["Routes", "Ghost"], "compiler": "nextjs" },
                "rust": { "mode": "code", "allowedChildren": [] },
              },
              "namespaces": {
                "Routes": { "aliasOf": "app", "allowedChildren": ["*"] },
                "Styles": { "aliasOf": "styles" },
                "Backend": { "allowedChildren": ["Commands"] },
              },
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn load_minimal_registry() {
        let r = load_registry_from_str(MINIMAL).unwrap();
        assert!(r.root.is_none());
        assert_eq!(r.target("next").unwrap().mode, ParseMode::Markup);
        assert_eq!(r.valid_roots(), ["next"]);
        assert!(r.namespaces.is_empty());
    }

    #[test]
    fn load_accepts_comments_and_trailing_commas() {
        let r = sample();
        assert_eq!(r.target("rust").unwrap().mode, ParseMode::Code);
        assert_eq!(r.target("next").unwrap().compiler.as_deref(), Some("nextjs"));
    }

    #[test]
    fn valid_roots_lists_marker_then_targets() {
        let r = sample();
        assert_eq!(r.valid_roots(), ["project", "next", "rust"]);
        assert!(r.is_valid_root("project"));
        assert!(r.is_valid_root("rust"));
        assert!(!r.is_valid_root("Routes"));
    }

    #[test]
    fn kind_prefers_targets() {
        let r = sample();
        assert!(matches!(r.kind("next"), Some(Kind::Target(_))));
        assert!(matches!(r.kind("Routes"), Some(Kind::Namespace(_))));
        assert!(r.kind("nothing").is_none());
    }

    #[test]
    fn namespace_without_allowed_children_is_unrestricted() {
        let r = sample();
        assert!(r.namespace("Styles").unwrap().allowed_children.is_none());
    }

    #[test]
    fn dangling_references_are_reported_not_rejected() {
        let r = sample();
        let dangling = r.dangling_references();
        assert_eq!(
            dangling,
            vec![
                DanglingReference {
                    owner: "targets.next".into(),
                    child: "Ghost".into(),
                },
                DanglingReference {
                    owner: "namespaces.Backend".into(),
                    child: "Commands".into(),
                },
            ]
        );
    }

    #[test]
    fn empty_targets_rejected() {
        let err = load_registry_from_str(r#"{ "targets": {} }"#).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidField { ref field, .. } if field == "targets"));
    }

    #[test]
    fn missing_targets_rejected_as_json_error() {
        let err = load_registry_from_str(r#"{ "namespaces": {} }"#).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidJson(_)));
    }

    #[test]
    fn invalid_target_name_rejected() {
        let err = load_registry_from_str(r#"{ "targets": { "9lives": {} } }"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid targets.9lives: name must start with a letter and contain only letters, digits, '_' or '-'"
        );
    }

    #[test]
    fn root_keyword_collision_rejected() {
        let err = load_registry_from_str(
            r#"{ "root": { "keyword": "next" }, "targets": { "next": {} } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("collides"), "{err}");
    }

    #[test]
    fn empty_allowed_child_rejected() {
        let err = load_registry_from_str(
            r#"{ "targets": { "next": {} }, "namespaces": { "Routes": { "allowedChildren": [" "] } } }"#,
        )
        .unwrap_err();
        assert!(
            matches!(err, RegistryError::InvalidField { ref field, .. } if field == "namespaces.Routes.allowedChildren")
        );
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(
            load_registry_from_str("{ not json"),
            Err(RegistryError::InvalidJson(_))
        ));
    }

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("Routes"));
        assert!(is_identifier("my-page_2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("_private"));
        assert!(!is_identifier("dot.name"));
        assert!(!is_identifier("café"));
    }

    #[test]
    fn registry_serde_round_trip_keeps_schema_fields() {
        let r = sample();
        let json = serde_json::to_string(&r).unwrap();
        let back = load_registry_from_str(&json).unwrap();
        assert_eq!(back.targets, r.targets);
        assert_eq!(back.root, r.root);
        assert!(!json.contains("validRootsCache"));
    }

    #[test]
    fn unavailable_error_lists_candidates() {
        let err = RegistryError::Unavailable {
            tried: vec!["a/registry.json".into(), "embedded".into()],
        };
        assert_eq!(
            err.to_string(),
            "no registry could be loaded (tried: a/registry.json, embedded)"
        );
    }
}
