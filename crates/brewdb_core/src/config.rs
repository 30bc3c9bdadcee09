//! Database configuration.

/// On-disk format version stamped into newly created stores.
pub const FORMAT_VERSION: &str = "1.0.0";

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the database if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to copy the current file to a backup path before each
    /// replacement write.
    pub backup: bool,

    /// Format version to stamp into new databases.
    pub format_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            backup: true,
            format_version: FORMAT_VERSION.to_string(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the database if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to keep a backup of the previous on-disk snapshot.
    #[must_use]
    pub const fn backup(mut self, value: bool) -> Self {
        self.backup = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.create_if_missing);
        assert!(config.backup);
        assert_eq!(config.format_version, FORMAT_VERSION);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new().create_if_missing(false).backup(false);
        assert!(!config.create_if_missing);
        assert!(!config.backup);
    }
}
