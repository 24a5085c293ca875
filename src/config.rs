use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub install_dir: String,
    pub bundle_url: String,
    pub checksum_url: String,
    pub appcast_url: String,
    pub disable_sandbox: bool,
    pub startup_delay_secs: u64,
    pub check_interval_mins: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            install_dir: "~/.local/share/lumen".to_string(),
            bundle_url: "https://download.lumen.app/mac/Lumen.dmg".to_string(),
            checksum_url: "https://download.lumen.app/mac/SHA256SUMS".to_string(),
            appcast_url: "https://download.lumen.app/mac/appcast.xml".to_string(),
            disable_sandbox: false,
            startup_delay_secs: 30,
            check_interval_mins: 15,
        }
    }
}

impl Config {
    pub fn install_dir_path(&self) -> PathBuf {
        expand_tilde(&self.install_dir)
    }
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(".config/lumen-linux/config.toml")
}

pub fn cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(".cache/lumen-linux")
}

pub fn cached_bundle_path() -> PathBuf {
    cache_dir().join("Lumen.dmg")
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        if path == "~" {
            return home;
        }
        if let Some(rest) = path.strip_prefix("~/") {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = load_from(&config_path())?;
    apply_env(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

pub fn load_from(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                eprintln!(
                    "{} failed to parse {}: {e}",
                    style("warning:").yellow().bold(),
                    path.display()
                );
                Ok(Config::default())
            }
        }
    } else {
        let config = Config::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(&config)?)?;
        Ok(config)
    }
}

pub fn apply_env(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = lookup("LUMEN_INSTALL_DIR")
        && !dir.is_empty()
    {
        config.install_dir = dir;
    }
    if let Some(value) = lookup("LUMEN_NO_SANDBOX")
        && value != "0"
    {
        config.disable_sandbox = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.install_dir, "~/.local/share/lumen");
        assert!(!config.disable_sandbox);
    }

    #[test]
    fn default_config_is_toml_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        load_from(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("install_dir"));
        assert!(content.contains("appcast_url"));
    }

    #[test]
    fn loads_existing_toml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "install_dir = \"/opt/lumen\"\ndisable_sandbox = true\n").unwrap();

        let config = load_from(&path).unwrap();

        assert_eq!(config.install_dir, "/opt/lumen");
        assert!(config.disable_sandbox);
    }

    #[test]
    fn handles_partial_config_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "check_interval_mins = 60\n").unwrap();

        let config = load_from(&path).unwrap();

        assert_eq!(config.check_interval_mins, 60);
        assert_eq!(config.startup_delay_secs, 30);
        assert!(config.appcast_url.contains("appcast.xml"));
    }

    #[test]
    fn falls_back_to_defaults_on_malformed_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "{{invalid toml").unwrap();

        let config = load_from(&path).unwrap();

        assert_eq!(config.install_dir, "~/.local/share/lumen");
    }

    #[test]
    fn expands_tilde_in_install_dir() {
        let home = dirs::home_dir().unwrap();
        let config = Config::default();

        assert_eq!(config.install_dir_path(), home.join(".local/share/lumen"));
    }

    #[test]
    fn leaves_absolute_install_dir_unchanged() {
        let mut config = Config::default();
        config.install_dir = "/opt/lumen".to_string();

        assert_eq!(config.install_dir_path(), PathBuf::from("/opt/lumen"));
    }

    #[test]
    fn expands_bare_tilde() {
        let home = dirs::home_dir().unwrap();

        assert_eq!(expand_tilde("~"), home);
    }

    #[test]
    fn env_overrides_install_dir() {
        let mut config = Config::default();

        apply_env(&mut config, |key| {
            (key == "LUMEN_INSTALL_DIR").then(|| "/tmp/lumen-test".to_string())
        });

        assert_eq!(config.install_dir, "/tmp/lumen-test");
    }

    #[test]
    fn env_enables_sandbox_disable() {
        let mut config = Config::default();

        apply_env(&mut config, |key| {
            (key == "LUMEN_NO_SANDBOX").then(|| "1".to_string())
        });

        assert!(config.disable_sandbox);
    }

    #[test]
    fn env_sandbox_zero_is_ignored() {
        let mut config = Config::default();

        apply_env(&mut config, |key| {
            (key == "LUMEN_NO_SANDBOX").then(|| "0".to_string())
        });

        assert!(!config.disable_sandbox);
    }

    #[test]
    fn empty_env_install_dir_is_ignored() {
        let mut config = Config::default();

        apply_env(&mut config, |key| {
            (key == "LUMEN_INSTALL_DIR").then(String::new)
        });

        assert_eq!(config.install_dir, "~/.local/share/lumen");
    }

    #[test]
    fn cached_bundle_lives_under_cache_dir() {
        assert!(cached_bundle_path().starts_with(cache_dir()));
        assert!(cached_bundle_path().ends_with("Lumen.dmg"));
    }
}
