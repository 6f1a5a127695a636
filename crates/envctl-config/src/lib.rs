pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a config file
pub const CONFIG_ENV_VAR: &str = "ENVCTL_CONFIG";

/// Default file name written by `envctl init`
pub const CONFIG_FILE_NAME: &str = "envctl.kdl";

/// Searched in this order inside each candidate directory
const CANDIDATES: [&str; 4] = [
    "envctl.local.kdl",
    ".envctl.local.kdl",
    "envctl.kdl",
    ".envctl.kdl",
];

/// `~/.config/envctl`, created if missing
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("envctl");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Locate the config file
///
/// Search order:
/// 1. `explicit` (from `--config`), which must exist
/// 2. `ENVCTL_CONFIG`, which must exist
/// 3. current directory: envctl.local.kdl, .envctl.local.kdl, envctl.kdl, .envctl.kdl
/// 4. `./.envctl/` with the same names
/// 5. `~/.config/envctl/envctl.kdl`
///
/// `Ok(None)` means nothing was found and the built-in environments apply.
pub fn find_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let current_dir = std::env::current_dir()?;
    find_config_file_from(&current_dir, explicit)
}

/// [`find_config_file`] starting from `start_dir` instead of the cwd
pub fn find_config_file_from(start_dir: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf()).map(Some);
    }

    if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR)
        && !config_path.is_empty()
    {
        return existing(PathBuf::from(config_path)).map(Some);
    }

    if let Some(path) = search_dir(start_dir) {
        return Ok(Some(path));
    }

    let dot_dir = start_dir.join(".envctl");
    if dot_dir.is_dir()
        && let Some(path) = search_dir(&dot_dir)
    {
        return Ok(Some(path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("envctl").join(CONFIG_FILE_NAME);
        if global.exists() {
            tracing::debug!(path = %global.display(), "Using global config");
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// Write `content` to `path`, refusing to overwrite
pub fn write_new_config(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn search_dir(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(ConfigError::ConfigFileNotFound(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_find_in_start_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("envctl.kdl"), "// test").unwrap();

        temp_env::with_var_unset(CONFIG_ENV_VAR, || {
            let found = find_config_file_from(temp_dir.path(), None).unwrap();
            assert_eq!(found, Some(temp_dir.path().join("envctl.kdl")));
        });
    }

    #[test]
    #[serial]
    fn test_local_file_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("envctl.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join("envctl.local.kdl"), "// local").unwrap();

        temp_env::with_var_unset(CONFIG_ENV_VAR, || {
            let found = find_config_file_from(temp_dir.path(), None).unwrap().unwrap();
            assert!(found.ends_with("envctl.local.kdl"));
        });
    }

    #[test]
    #[serial]
    fn test_hidden_local_before_visible() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(".envctl.local.kdl"), "// hidden local").unwrap();
        fs::write(temp_dir.path().join("envctl.kdl"), "// visible").unwrap();

        temp_env::with_var_unset(CONFIG_ENV_VAR, || {
            let found = find_config_file_from(temp_dir.path(), None).unwrap().unwrap();
            assert!(found.ends_with(".envctl.local.kdl"));
        });
    }

    #[test]
    #[serial]
    fn test_find_in_dot_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dot_dir = temp_dir.path().join(".envctl");
        fs::create_dir(&dot_dir).unwrap();
        fs::write(dot_dir.join("envctl.kdl"), "// in dot dir").unwrap();

        temp_env::with_var_unset(CONFIG_ENV_VAR, || {
            let found = find_config_file_from(temp_dir.path(), None).unwrap().unwrap();
            assert!(found.ends_with(".envctl/envctl.kdl"));
        });
    }

    #[test]
    #[serial]
    fn test_env_var_takes_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("envctl.kdl"), "// cwd").unwrap();
        let custom = temp_dir.path().join("custom.kdl");
        fs::write(&custom, "// custom").unwrap();

        temp_env::with_var(CONFIG_ENV_VAR, Some(custom.to_str().unwrap()), || {
            let found = find_config_file_from(temp_dir.path(), None).unwrap();
            assert_eq!(found, Some(custom.clone()));
        });
    }

    #[test]
    #[serial]
    fn test_env_var_missing_file_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope.kdl");

        temp_env::with_var(CONFIG_ENV_VAR, Some(missing.to_str().unwrap()), || {
            let result = find_config_file_from(temp_dir.path(), None);
            assert!(matches!(result, Err(ConfigError::ConfigFileNotFound(_))));
        });
    }

    #[test]
    #[serial]
    fn test_empty_env_var_falls_through_to_search() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dot_dir = temp_dir.path().join(".envctl");
        fs::create_dir(&dot_dir).unwrap();
        fs::write(dot_dir.join("envctl.kdl"), "// in dot dir").unwrap();

        temp_env::with_var(CONFIG_ENV_VAR, Some(""), || {
            let found = find_config_file_from(temp_dir.path(), None).unwrap().unwrap();
            assert!(found.ends_with(".envctl/envctl.kdl"));
        });
    }

    #[test]
    #[serial]
    fn test_empty_dot_dir_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join(".envctl")).unwrap();

        temp_env::with_vars(
            [
                (CONFIG_ENV_VAR, None),
                ("XDG_CONFIG_HOME", Some(temp_dir.path().to_str().unwrap())),
                ("HOME", Some(temp_dir.path().to_str().unwrap())),
            ],
            || {
                let found = find_config_file_from(temp_dir.path(), None).unwrap();
                assert_eq!(found, None);
            },
        );
    }

    #[test]
    #[serial]
    fn test_explicit_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let explicit = temp_dir.path().join("team.kdl");
        fs::write(&explicit, "// team").unwrap();

        let found = find_config_file_from(temp_dir.path(), Some(&explicit)).unwrap();
        assert_eq!(found, Some(explicit));

        let missing = temp_dir.path().join("other.kdl");
        assert!(find_config_file_from(temp_dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_write_new_config_refuses_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("envctl.kdl");

        write_new_config(&path, "project \"x\"\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "project \"x\"\n");

        let result = write_new_config(&path, "project \"y\"\n");
        assert!(matches!(result, Err(ConfigError::AlreadyExists(_))));
    }
}
