//! Language configuration for `syscomb-core`.
//!
//! A YAML file describes, per language code, the decision parameters and,
//! per corpus, the total audio duration and the keyword list files. A run
//! picks one `(language, corpus, kwlist id)` triple out of it and gets a
//! `RunSettings` value back.
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::SyscombError;

/// File name looked up in the standard configuration locations.
pub const CONFIG_FILE_NAME: &str = "languages.yaml";

/// Default false-alarm cost ratio.
pub const DEFAULT_BETA: f64 = 999.9;

/// Fallback decision parameters shared by every language.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecisionDefaults {
    pub beta: f64,
    pub posterior_boost: f64,
}

impl Default for DecisionDefaults {
    fn default() -> Self {
        Self {
            beta: DEFAULT_BETA,
            posterior_boost: 1.0,
        }
    }
}

/// Settings of one evaluation corpus (e.g. `dev` or `eval`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CorpusConfig {
    /// Total duration of the corpus audio, in seconds.
    pub total_duration: f64,
    /// Keyword list file per keyword-list id.
    #[serde(default)]
    pub kwlists: BTreeMap<String, PathBuf>,
}

/// Settings of one language.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LanguageEntry {
    /// Language tag written into the output header.
    pub name: String,
    pub beta: Option<f64>,
    pub posterior_boost: Option<f64>,
    #[serde(default)]
    pub corpora: BTreeMap<String, CorpusConfig>,
}

/// Top-level language configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LanguageConfig {
    #[serde(default)]
    pub defaults: DecisionDefaults,
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageEntry>,
    /// Directory relative kwlist paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Everything a combination run needs to know about its evaluation setting.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub language_code: String,
    pub language: String,
    pub corpus: String,
    pub kwlist_id: String,
    pub kwlist_file: PathBuf,
    pub beta: f64,
    pub total_duration: f64,
    pub posterior_boost: f64,
}

impl LanguageConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: LanguageConfig =
            serde_yml::from_str(text).context("Failed to parse language configuration")?;
        Ok(config)
    }

    /// Loads a configuration file; relative kwlist paths resolve against its directory.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading language configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        debug!("Loaded {} language entries.", config.languages.len());
        Ok(config)
    }

    /// Loads `explicit` if given, otherwise the first file found in
    /// [`config_candidate_paths`].
    pub fn locate_and_load(explicit: Option<&Path>) -> std::result::Result<Self, SyscombError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => config_candidate_paths()
                .into_iter()
                .find(|p| p.is_file())
                .ok_or_else(|| {
                    SyscombError::Config(format!(
                        "no {} found; pass --config or create one in ~/.syscomb/",
                        CONFIG_FILE_NAME
                    ))
                })?,
        };
        if !path.is_file() {
            return Err(SyscombError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        Ok(Self::load_from_file(&path)?)
    }

    /// Picks the settings for one language, corpus and keyword list.
    pub fn resolve(
        &self,
        language_code: &str,
        corpus: &str,
        kwlist_id: &str,
    ) -> std::result::Result<RunSettings, SyscombError> {
        let lang = self.languages.get(language_code).ok_or_else(|| {
            SyscombError::Config(format!("unknown language code '{}'", language_code))
        })?;
        let corpus_cfg = lang.corpora.get(corpus).ok_or_else(|| {
            SyscombError::Config(format!(
                "language '{}' has no corpus '{}'",
                language_code, corpus
            ))
        })?;
        let kwlist = corpus_cfg.kwlists.get(kwlist_id).ok_or_else(|| {
            SyscombError::Config(format!(
                "corpus '{}' of language '{}' has no keyword list '{}'",
                corpus, language_code, kwlist_id
            ))
        })?;

        let kwlist_file = match &self.base_dir {
            Some(base) if kwlist.is_relative() => base.join(kwlist),
            _ => kwlist.clone(),
        };

        let name = if lang.name.is_empty() {
            language_code.to_string()
        } else {
            lang.name.clone()
        };

        Ok(RunSettings {
            language_code: language_code.to_string(),
            language: name,
            corpus: corpus.to_string(),
            kwlist_id: kwlist_id.to_string(),
            kwlist_file,
            beta: lang.beta.unwrap_or(self.defaults.beta),
            total_duration: corpus_cfg.total_duration,
            posterior_boost: lang.posterior_boost.unwrap_or(self.defaults.posterior_boost),
        })
    }
}

/// Standard locations searched for the language configuration, in order.
pub fn config_candidate_paths() -> Vec<PathBuf> {
    let base_dirs = vec![
        dirs::home_dir().map(|p| p.join(".syscomb")),
        dirs::config_dir().map(|p| p.join("syscomb")),
        Some(PathBuf::from("/etc/syscomb")),
        Some(PathBuf::from("./config")),
    ];

    base_dirs
        .into_iter()
        .flatten()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .collect()
}
