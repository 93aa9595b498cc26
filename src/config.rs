// src/config.rs

//! Configuration loading utilities.
//!
//! Loads the TOML configuration and applies environment overrides for
//! the values that should not live in a config file.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load, override and validate the configuration.
pub fn load(path: &Path) -> Result<Config> {
    let mut config = Config::load(path)?;
    apply_overrides(&mut config, |name| std::env::var(name).ok());
    config.validate()?;
    Ok(config)
}

/// Apply environment overrides for secrets and credentials.
fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(value) = lookup("POCKET_CONSUMER_KEY") {
        config.remote.consumer_key = value;
    }
    if let Some(value) = lookup("POCKET_ACCESS_TOKEN") {
        config.remote.access_token = value;
    }
    if let Some(value) = lookup("FEEDSTASH_USERNAME") {
        config.server.username = value;
    }
    if let Some(value) = lookup("FEEDSTASH_PASSWORD") {
        config.server.password = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [remote]
            consumer_key = "ck"
            access_token = "at"

            [[sources]]
            id = "news"
            feeds = ["https://example.com/rss.xml"]
            "#
        )
        .unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.remote.consumer_key, "ck");
        assert!(config.feeds_for("news").is_some());
    }

    #[test]
    fn load_fails_on_missing_file() {
        assert!(load(Path::new("/nonexistent/config.toml")).is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = Config::default();
        config.remote.consumer_key = "from-file".into();

        apply_overrides(&mut config, |name| {
            (name == "POCKET_CONSUMER_KEY").then(|| "from-env".to_string())
        });

        assert_eq!(config.remote.consumer_key, "from-env");
        assert!(config.remote.access_token.is_empty());
    }
}
