use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::AppResult;
use crate::util::{get_config_path, get_db_path};

pub const ENV_PREFIX: &str = "TAPNOTES";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub database_path: PathBuf,
    #[serde(default)]
    pub default_user: Option<String>,
    pub legacy_owner: String,
    pub trash_retention_days: u32,
    pub log_filter: String,
}

impl Settings {
    /// Defaults, then the TOML file, then `TAPNOTES_*` environment variables.
    /// An explicitly named file must exist; the default one is optional.
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (get_config_path(), false),
        };

        let settings = config::Config::builder()
            .set_default("database_path", get_db_path().to_string_lossy().into_owned())?
            .set_default("legacy_owner", "local")?
            .set_default("trash_retention_days", 30_i64)?
            .set_default("log_filter", "info")?
            .add_source(config::File::from(path.as_path()).required(required))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    pub fn trash_retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.trash_retention_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tapnotes.toml");
        fs::write(
            &path,
            "database_path = \"/tmp/custom.db\"\ndefault_user = \"u1\"\ntrash_retention_days = 7\n",
        )
        .expect("write config");

        let settings = Settings::load(Some(&path)).expect("load");
        assert_eq!(settings.database_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(settings.default_user.as_deref(), Some("u1"));
        assert_eq!(settings.trash_retention_days, 7);
        assert_eq!(settings.legacy_owner, "local");
        assert_eq!(settings.log_filter, "info");
        assert_eq!(settings.trash_retention(), chrono::Duration::days(7));
    }

    #[test]
    fn named_file_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.toml");
        assert!(Settings::load(Some(&missing)).is_err());
    }
}
