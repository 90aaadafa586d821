use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoursemateError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_ms: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 800,
            temperature: 0.0,
            timeout_ms: 60000,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub catalog_path: PathBuf,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("docs/courses.json"),
            max_results: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Exchanges kept per session
    pub max_history: usize,
    pub store_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history: 2,
            store_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("coursemate"),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then validate it
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let config = Self::resolve(config_path)?;
        config.validate()?;
        Ok(config)
    }

    fn resolve(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).map_err(|e| {
                CoursemateError::Config(format!("Failed to load config from {}: {}", path.display(), e))
            });
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject settings that would otherwise only fail at query time
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 {
            return Err(CoursemateError::Config(
                "search.max_results must be a positive integer".to_string(),
            ));
        }
        if self.session.max_history == 0 {
            return Err(CoursemateError::Config(
                "session.max_history must be a positive integer".to_string(),
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(CoursemateError::Config("llm.max_tokens must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.session.max_history, 2);
        assert_eq!(config.llm.max_tokens, 800);
        assert_eq!(config.llm.temperature, 0.0);
    }

    #[test]
    fn test_zero_max_results_rejected() {
        let mut config = Config::default();
        config.search.max_results = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn test_zero_max_history_rejected() {
        let mut config = Config::default();
        config.session.max_history = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file_with_partial_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coursemate.yml");
        fs::write(&path, "search:\n  max_results: 3\nllm:\n  model: claude-test\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.llm.model, "claude-test");
        assert_eq!(config.llm.max_tokens, 800);
        assert_eq!(config.session.max_history, 2);
    }

    #[test]
    fn test_load_rejects_zero_max_results_at_config_time() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coursemate.yml");
        fs::write(&path, "search:\n  max_results: 0\n").unwrap();

        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(CoursemateError::Config(_))));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
