use crate::core::eligibility::{DEFAULT_TOTAL_CLASSES, EligibilityCalculator};
use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DIR_NAME: &str = ".rattendance";
const CONFIG_NAME: &str = "rattendance.conf";
const LEDGER_NAME: &str = "rattendance.sqlite";
const STATE_NAME: &str = "state.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite ledger file.
    #[serde(default = "default_ledger")]
    pub ledger: String,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_total_classes")]
    pub total_classes: u32,
    /// Closed sessions shorter than this count as a shortage.
    #[serde(default)]
    pub min_session_minutes: u32,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub tracker_url: Option<String>,
}

fn default_ledger() -> String {
    Config::config_dir().join(LEDGER_NAME).to_string_lossy().to_string()
}

fn default_state_file() -> String {
    Config::config_dir().join(STATE_NAME).to_string_lossy().to_string()
}

fn default_total_classes() -> u32 {
    DEFAULT_TOTAL_CLASSES
}

fn default_refresh_interval() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger: default_ledger(),
            state_file: default_state_file(),
            total_classes: default_total_classes(),
            min_session_minutes: 0,
            refresh_interval_secs: default_refresh_interval(),
            tracker_url: None,
        }
    }
}

impl Config {
    /// `~/.rattendance`
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DIR_NAME)
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_NAME)
    }

    /// Load the config file, or defaults when there is none.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let cfg: Config = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.calculator()?;
        if self.refresh_interval_secs == 0 {
            return Err(AppError::Config(
                "refresh_interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn calculator(&self) -> AppResult<EligibilityCalculator> {
        EligibilityCalculator::new(self.total_classes)
    }

    pub fn ledger_path(&self) -> PathBuf {
        expand_tilde(&self.ledger)
    }

    pub fn state_path(&self) -> PathBuf {
        expand_tilde(&self.state_file)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Write the config file (unless `is_test`) and create the ledger
    /// directory. Returns the config that was set up.
    pub fn init_all(ledger: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        let mut cfg = Self::default();

        if let Some(name) = ledger {
            let p = expand_tilde(&name);
            cfg.ledger = if p.is_absolute() {
                p
            } else {
                dir.join(p)
            }
            .to_string_lossy()
            .to_string();
        }

        if !is_test {
            cfg.save_to(&Self::config_file())?;
        }

        if let Some(parent) = cfg.ledger_path().parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(cfg)
    }

    /// Keys missing from the config file at `path`; with `fix`, they are
    /// added with their default value.
    pub fn check_file(path: &Path, fix: bool) -> AppResult<Vec<String>> {
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let mut map: Mapping = if content.trim().is_empty() {
            Mapping::new()
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?
        };

        let defaults = serde_yaml::to_value(Self::default()).map_err(|_| AppError::ConfigSave)?;
        let Value::Mapping(defaults) = defaults else {
            return Err(AppError::Other("config defaults are not a mapping".into()));
        };

        let mut missing = Vec::new();
        for (key, value) in defaults {
            if !map.contains_key(&key) {
                if let Value::String(k) = &key {
                    missing.push(k.clone());
                }
                map.insert(key, value);
            }
        }

        if fix && !missing.is_empty() {
            let yaml = serde_yaml::to_string(&map).map_err(|_| AppError::ConfigSave)?;
            fs::write(path, yaml)?;
        }

        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// `rattendance_cfg_<name>_<pid>.conf` in the temp dir.
    fn temp(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(format!(
            "rattendance_cfg_{name}_{}.conf",
            std::process::id()
        ));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn temp_files_are_per_process() {
        let path = temp("pid", "");
        let file = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file.ends_with(&format!("_{}.conf", std::process::id())));
        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_fields_take_defaults() {
        let path = temp("defaults", "ledger: /tmp/x.sqlite\n");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.ledger, "/tmp/x.sqlite");
        assert_eq!(cfg.total_classes, 50);
        assert_eq!(cfg.refresh_interval_secs, 30);
        assert_eq!(cfg.tracker_url, None);
        fs::remove_file(path).ok();
    }

    #[test]
    fn zero_total_classes_is_rejected() {
        let path = temp("zero", "total_classes: 0\n");
        assert!(matches!(
            Config::load_from(&path),
            Err(AppError::Config(_))
        ));
        fs::remove_file(path).ok();
    }

    #[test]
    fn check_reports_and_fills_missing_keys() {
        let path = temp("check", "ledger: /tmp/x.sqlite\n");

        let missing = Config::check_file(&path, true).unwrap();
        assert!(missing.contains(&"total_classes".to_string()));
        assert!(!missing.contains(&"ledger".to_string()));

        assert!(Config::check_file(&path, false).unwrap().is_empty());
        assert_eq!(Config::load_from(&path).unwrap().ledger, "/tmp/x.sqlite");
        fs::remove_file(path).ok();
    }
}
