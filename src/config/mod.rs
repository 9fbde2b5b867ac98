use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    core::history::DEFAULT_HISTORY_LIMIT,
    domain::MoneyFormat,
    errors::{CloseError, Result},
    export::CsvOptions,
    storage::json_backend::replace_file,
    utils::paths::{app_data_dir, config_file_in, default_ledger_file_in, ensure_dir},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Ledger location; relative paths resolve against the app directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_file: Option<PathBuf>,
    pub currency_symbol: String,
    pub csv_delimiter: char,
    pub decimal_separator: char,
    /// `null` in the file means no grouping; only an absent key takes the default.
    pub grouping_separator: Option<char>,
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_file: None,
            currency_symbol: "€".into(),
            csv_delimiter: ';',
            decimal_separator: ',',
            grouping_separator: Some('.'),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    pub fn money_format(&self) -> MoneyFormat {
        MoneyFormat {
            symbol: self.currency_symbol.clone(),
            decimal_separator: self.decimal_separator,
            grouping_separator: self.grouping_separator,
        }
    }

    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            delimiter: self.csv_delimiter as u8,
            decimal_separator: self.decimal_separator,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.csv_delimiter.is_ascii() || self.csv_delimiter.is_ascii_alphanumeric() {
            return Err(CloseError::Config(format!(
                "csv delimiter `{}` must be an ASCII punctuation character",
                self.csv_delimiter
            )));
        }
        if self.csv_delimiter == self.decimal_separator {
            return Err(CloseError::Config(
                "csv delimiter and decimal separator must differ".into(),
            ));
        }
        if self.grouping_separator == Some(self.decimal_separator) {
            return Err(CloseError::Config(
                "grouping and decimal separators must differ".into(),
            ));
        }
        if !(1..=DEFAULT_HISTORY_LIMIT).contains(&self.history_limit) {
            return Err(CloseError::Config(format!(
                "history limit must be between 1 and {DEFAULT_HISTORY_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Updates one setting from its textual form, validating the result.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "ledgerFile" => {
                updated.ledger_file = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            "currencySymbol" => updated.currency_symbol = value.to_string(),
            "csvDelimiter" => updated.csv_delimiter = single_char(key, value)?,
            "decimalSeparator" => updated.decimal_separator = single_char(key, value)?,
            "groupingSeparator" => {
                updated.grouping_separator = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(single_char(key, value)?)
                }
            }
            "historyLimit" => {
                updated.history_limit = value.trim().parse().map_err(|_| {
                    CloseError::Config(format!("`{value}` is not a valid history limit"))
                })?
            }
            other => return Err(CloseError::Config(format!("unknown setting `{other}`"))),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub const KEYS: [&'static str; 6] = [
        "ledgerFile",
        "currencySymbol",
        "csvDelimiter",
        "decimalSeparator",
        "groupingSeparator",
        "historyLimit",
    ];
}

fn single_char(key: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(CloseError::Config(format!(
            "`{key}` expects a single character"
        ))),
    }
}

/// Loads and saves `config.json` inside the application directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(err) => return Err(err.into()),
        };
        let config: Config = serde_json::from_str(&data).map_err(|err| {
            CloseError::Config(format!("{}: {}", self.path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        replace_file(&self.path, json.as_bytes())
    }

    /// Where the ledger for `config` lives.
    pub fn ledger_path(&self, config: &Config) -> PathBuf {
        match &config.ledger_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.base.join(path),
            None => default_ledger_file_in(&self.base),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
        assert_eq!(
            manager.ledger_path(&Config::default()),
            temp.path().join("data").join("closures.json")
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("csvDelimiter", ",").unwrap_err();
        config.set("decimalSeparator", ".").unwrap_err();
        config.set("groupingSeparator", "none").unwrap();
        config.set("decimalSeparator", ".").unwrap();
        config.set("csvDelimiter", ",").unwrap();
        config.set("historyLimit", "3").unwrap();
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn disabled_grouping_survives_a_reload() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("groupingSeparator", "none").unwrap();
        config.set("decimalSeparator", ".").unwrap();
        manager.save(&config).unwrap();

        let saved = fs::read_to_string(manager.path()).unwrap();
        assert!(saved.contains("\"groupingSeparator\": null"), "{saved}");
        let reloaded = manager.load().unwrap();
        assert_eq!(reloaded.grouping_separator, None);
        assert_eq!(reloaded.decimal_separator, '.');
    }

    #[test]
    fn relative_ledger_file_resolves_under_base() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("ledgerFile", "venue/closures.json").unwrap();
        assert_eq!(
            manager.ledger_path(&config),
            temp.path().join("venue/closures.json")
        );
    }

    #[test]
    fn invalid_settings_are_rejected_without_mutation() {
        let mut config = Config::default();
        assert!(config.set("historyLimit", "0").is_err());
        assert!(config.set("historyLimit", "6").is_err());
        assert!(config.set("historyLimit", "many").is_err());
        assert!(config.set("theme", "dark").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "{ not json").unwrap();
        assert!(matches!(manager.load(), Err(CloseError::Config(_))));
    }
}
