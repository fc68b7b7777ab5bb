//! Options controlling diffing and rendering.

/// Schema that is rendered without qualification unless overridden.
pub const DEFAULT_SCHEMA: &str = "public";

/// Minimum name similarity for a dropped/added pair to be reported as a
/// possible rename.
pub const DEFAULT_RENAME_THRESHOLD: f64 = 0.4;

/// Options for [`autogenerate_migration_with`](crate::autogenerate_migration_with).
#[derive(Debug, Clone, PartialEq)]
pub struct AutogenOptions {
    /// Tables in this schema (or with an empty schema) are rendered
    /// unqualified.
    pub default_schema: String,
    /// Whether to report drop+add pairs that look like renames.
    pub detect_renames: bool,
    /// Similarity threshold for rename hints (0.0 to 1.0).
    pub rename_threshold: f64,
}

impl Default for AutogenOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AutogenOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_schema: DEFAULT_SCHEMA.to_string(),
            detect_renames: true,
            rename_threshold: DEFAULT_RENAME_THRESHOLD,
        }
    }

    /// Sets the schema rendered without qualification.
    #[must_use]
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    /// Disables rename hints.
    #[must_use]
    pub const fn without_rename_detection(mut self) -> Self {
        self.detect_renames = false;
        self
    }

    /// Sets the rename similarity threshold, clamped to `[0.0, 1.0]`.
    #[must_use]
    pub fn with_rename_threshold(mut self, threshold: f64) -> Self {
        self.rename_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Returns the schema to qualify `schema` with, or `None` when it is
    /// the default schema.
    #[must_use]
    pub fn qualifier<'a>(&self, schema: &'a str) -> Option<&'a str> {
        if schema.is_empty() || schema == self.default_schema {
            None
        } else {
            Some(schema)
        }
    }
}
