//! I/O handle registry consulted when deciding whether a bareword names a
//! destination stream.

use std::collections::HashSet;

/// Handles that always live in `main::`, whatever the current package.
const ROOT_HANDLES: &[&str] = &["STDIN", "STDOUT", "STDERR", "ARGV", "ARGVOUT", "ENV", "INC"];

/// Answers whether an I/O handle is declared.
pub trait SymbolRegistry {
    /// `name` is already normalized (see [`normalize_handle_name`]).
    fn exists_handle(&self, name: &str) -> bool;
}

/// Fully qualifies a handle name against the current package.
#[must_use]
pub fn normalize_handle_name(name: &str, package: &str) -> String {
    if let Some(rest) = name.strip_prefix("::") {
        return format!("main::{rest}");
    }
    if name.contains("::") {
        return name.to_string();
    }
    if ROOT_HANDLES.contains(&name) {
        return format!("main::{name}");
    }
    format!("{package}::{name}")
}

/// Set-backed registry seeded with the standard streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleTable {
    handles: HashSet<String>,
}

impl HandleTable {
    #[must_use]
    pub fn new() -> Self {
        let handles = ["STDIN", "STDOUT", "STDERR"]
            .iter()
            .map(|name| format!("main::{name}"))
            .collect();
        Self { handles }
    }

    /// Declares a handle by its normalized name.
    pub fn declare(&mut self, name: impl Into<String>) {
        self.handles.insert(name.into());
    }

    /// Declares a handle, qualifying it against `package`.
    #[must_use]
    pub fn with_handle(mut self, name: &str, package: &str) -> Self {
        self.declare(normalize_handle_name(name, package));
        self
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolRegistry for HandleTable {
    fn exists_handle(&self, name: &str) -> bool {
        self.handles.contains(name)
    }
}
