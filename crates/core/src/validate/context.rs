//! Scope frames and the stack the validator keeps while walking a document.

use z_toolchain_registry::{Kind, ParseMode, Registry, WILDCARD};

/// Children accepted inside a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedChildren {
    /// Wildcard: anything is accepted, including unregistered kinds.
    Any,
    /// Exactly these kinds, in registry order.
    Only(Vec<String>),
}

impl AllowedChildren {
    fn from_list(list: &[String]) -> Self {
        if list.iter().any(|c| c == WILDCARD) {
            AllowedChildren::Any
        } else {
            AllowedChildren::Only(list.to_vec())
        }
    }

    /// `true` if `keyword` may appear directly inside the scope.
    pub fn allows(&self, keyword: &str) -> bool {
        match self {
            AllowedChildren::Any => true,
            AllowedChildren::Only(list) => list.iter().any(|c| c == keyword),
        }
    }

    /// Comma-separated listing for messages (`*` for the wildcard).
    pub fn describe(&self) -> String {
        match self {
            AllowedChildren::Any => WILDCARD.to_string(),
            AllowedChildren::Only(list) if list.is_empty() => "(none)".to_string(),
            AllowedChildren::Only(list) => list.join(", "),
        }
    }
}

/// One open `{` scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    /// Keyword of the element that opened the scope.
    pub element_type: String,
    /// Name of the element that opened the scope.
    pub element_name: String,
    /// Children accepted directly inside the scope.
    pub allowed_children: AllowedChildren,
    /// Parse mode of the scope body.
    pub mode: ParseMode,
    /// Zero-based line of the opening declaration.
    pub line: u32,
}

/// Stack of open scopes. [`push`](Self::push) and [`pop`](Self::pop) are the
/// only mutators.
#[derive(Debug)]
pub struct ContextStack<'r> {
    registry: &'r Registry,
    frames: Vec<ValidationContext>,
}

impl<'r> ContextStack<'r> {
    /// Empty stack resolving kinds against `registry`.
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            frames: Vec::new(),
        }
    }

    /// Open a scope for `keyword name` declared on `line`.
    ///
    /// Allowed children and mode are resolved in order: the root marker
    /// accepts every target; a target uses its own entry; a namespace uses
    /// its list (wildcard when it declares none) in markup mode; anything
    /// else is a wildcard markup scope.
    pub fn push(&mut self, keyword: &str, name: &str, line: u32) {
        let (allowed_children, mode) = if self.registry.is_root_marker(keyword) {
            let targets = self.registry.target_names().map(str::to_string).collect();
            (AllowedChildren::Only(targets), ParseMode::Markup)
        } else {
            match self.registry.kind(keyword) {
                Some(Kind::Target(t)) => (AllowedChildren::from_list(&t.allowed_children), t.mode),
                Some(Kind::Namespace(ns)) => (
                    ns.allowed_children
                        .as_deref()
                        .map_or(AllowedChildren::Any, AllowedChildren::from_list),
                    ParseMode::Markup,
                ),
                None => (AllowedChildren::Any, ParseMode::Markup),
            }
        };
        tracing::trace!(keyword, name, line, %mode, depth = self.frames.len() + 1, "push scope");
        self.frames.push(ValidationContext {
            element_type: keyword.to_string(),
            element_name: name.to_string(),
            allowed_children,
            mode,
            line,
        });
    }

    /// Close the innermost scope. Popping an empty stack does nothing.
    pub fn pop(&mut self) -> Option<ValidationContext> {
        let frame = self.frames.pop();
        match &frame {
            Some(f) => tracing::trace!(keyword = %f.element_type, depth = self.frames.len(), "pop scope"),
            None => tracing::trace!("unmatched closing brace ignored"),
        }
        frame
    }

    /// Innermost open scope, if any.
    pub fn current(&self) -> Option<&ValidationContext> {
        self.frames.last()
    }

    /// Number of open scopes (0 at the document root).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Open scopes, outermost first.
    pub fn frames(&self) -> &[ValidationContext] {
        &self.frames
    }
}
