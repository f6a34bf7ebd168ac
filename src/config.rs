use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::StoreOptions;
use crate::ui::theme::Theme;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_user_file")]
    pub user_file: String,
    #[serde(default = "default_topic")]
    pub default_topic: String,
    #[serde(default = "default_results_file")]
    pub results_file: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,
    #[serde(default = "default_min_enabled_questions")]
    pub min_enabled_questions: usize,
    #[serde(default = "default_question_width")]
    pub question_width: usize,
    #[serde(default = "default_user_width")]
    pub user_width: usize,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default)]
    pub colors: Theme,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quizdesk")
        .to_string_lossy()
        .to_string()
}
fn default_user_file() -> String {
    "users".to_string()
}
fn default_topic() -> String {
    "general".to_string()
}
fn default_results_file() -> String {
    "results.txt".to_string()
}
fn default_delimiter() -> char {
    ';'
}
fn default_rows_per_page() -> usize {
    10
}
fn default_min_enabled_questions() -> usize {
    5
}
fn default_question_width() -> usize {
    130
}
fn default_user_width() -> usize {
    70
}
fn default_log_file() -> String {
    "quizdesk.log".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            user_file: default_user_file(),
            default_topic: default_topic(),
            results_file: default_results_file(),
            delimiter: default_delimiter(),
            rows_per_page: default_rows_per_page(),
            min_enabled_questions: default_min_enabled_questions(),
            question_width: default_question_width(),
            user_width: default_user_width(),
            log_file: default_log_file(),
            colors: Theme::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizdesk")
            .join("config.toml")
    }

    /// Bring values that would break rendering or parsing back into range.
    pub fn validate(&mut self) {
        self.rows_per_page = self.rows_per_page.clamp(1, 100);
        self.min_enabled_questions = self.min_enabled_questions.max(1);
        self.question_width = self.question_width.clamp(60, 300);
        self.user_width = self.user_width.clamp(60, 200);
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            self.delimiter = default_delimiter();
        }
        if self.user_file.trim().is_empty() {
            self.user_file = default_user_file();
        }
        if self.default_topic.trim().is_empty() {
            self.default_topic = default_topic();
        }
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn results_path(&self) -> PathBuf {
        self.data_path().join(&self.results_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_path().join(&self.log_file)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            data_dir: self.data_path(),
            delimiter: u8::try_from(self.delimiter).unwrap_or(b';'),
            rows_per_page: self.rows_per_page,
        }
    }
}
