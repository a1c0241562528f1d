//! Parse configuration, built with consuming setters.

use crate::symbols::HandleTable;

/// Settings for [`parse_with`](crate::parse_with).
///
/// ```
/// use plfront::ParseOptions;
///
/// let options = ParseOptions::new().package("App").handle("LOG");
/// assert_eq!(options.initial_package(), "App");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    package: String,
    handles: Vec<String>,
}

impl ParseOptions {
    /// Starts in `main` with only the standard streams declared.
    #[must_use]
    pub fn new() -> Self {
        Self {
            package: "main".to_string(),
            handles: Vec::new(),
        }
    }

    /// Set the namespace parsing starts in.
    #[must_use]
    pub fn package(mut self, package: &str) -> Self {
        self.package = package.to_string();
        self
    }

    /// Declare an I/O handle. Unqualified names are qualified against the
    /// initial package.
    #[must_use]
    pub fn handle(mut self, name: &str) -> Self {
        self.handles.push(name.to_string());
        self
    }

    #[must_use]
    pub fn initial_package(&self) -> &str {
        &self.package
    }

    /// Registry holding the standard streams plus every declared handle.
    #[must_use]
    pub fn handle_table(&self) -> HandleTable {
        self.handles
            .iter()
            .fold(HandleTable::new(), |table, name| {
                table.with_handle(name, &self.package)
            })
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
