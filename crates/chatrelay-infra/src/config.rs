//! Configuration loading for chatrelay.
//!
//! Reads `config.toml` (by default from the data directory) into
//! [`AppConfig`], resolves prompt overrides into a [`PromptSet`], and reads
//! API keys from the environment as [`SecretString`]s.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use chatrelay_core::chat::prompt::PromptSet;
use chatrelay_types::config::{AppConfig, PromptConfig, PromptSource};
use chatrelay_types::error::ConfigError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CHATRELAY_DATA_DIR";

/// File name of the config inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `CHATRELAY_DATA_DIR` environment variable
/// 2. `~/.chatrelay`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".chatrelay");
    }

    PathBuf::from(".chatrelay")
}

/// Load configuration from `path`.
///
/// - A missing file yields [`AppConfig::default()`].
/// - A file that cannot be read or parsed is an error.
pub async fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<AppConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Resolve prompt overrides on top of the built-in templates.
///
/// Relative `file` paths are resolved against `base_dir`.
pub async fn load_prompts(config: &PromptConfig, base_dir: &Path) -> Result<PromptSet, ConfigError> {
    let mut prompts = PromptSet::default();
    let overrides = [
        (&config.system, &mut prompts.system),
        (&config.planner, &mut prompts.planner),
        (&config.rewrite, &mut prompts.rewrite),
        (&config.summary, &mut prompts.summary),
        (&config.title, &mut prompts.title),
    ];

    for (source, slot) in overrides {
        if let Some(source) = source {
            *slot = read_prompt(source, base_dir).await?;
        }
    }
    Ok(prompts)
}

async fn read_prompt(source: &PromptSource, base_dir: &Path) -> Result<String, ConfigError> {
    match source {
        PromptSource::Inline(text) => Ok(text.trim().to_string()),
        PromptSource::File { file } => {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                base_dir.join(file)
            };
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| ConfigError::Read {
                    path: path.display().to_string(),
                    message: err.to_string(),
                })?;
            Ok(text.trim().to_string())
        }
    }
}

/// Read a secret from the environment. Unset and blank values are `None`.
pub fn env_secret(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_core::chat::prompt::DEFAULT_PLANNER_PROMPT;
    use chatrelay_types::llm::ProviderKind;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE)).await.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.chat.default_provider, ProviderKind::Primary);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        tokio::fs::write(&path, "[server]\nport = 9000\n[chat]\ndefault_provider = \"gemini\"\n")
            .await
            .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.chat.default_provider, ProviderKind::Gemini);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let err = load_config(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn load_prompts_applies_overrides() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("title.txt"), "  Name it.\n")
            .await
            .unwrap();

        let config = PromptConfig {
            system: Some(PromptSource::Inline("Be terse.".to_string())),
            title: Some(PromptSource::File {
                file: PathBuf::from("title.txt"),
            }),
            ..Default::default()
        };
        let prompts = load_prompts(&config, tmp.path()).await.unwrap();
        assert_eq!(prompts.system, "Be terse.");
        assert_eq!(prompts.title, "Name it.");
        assert_eq!(prompts.planner, DEFAULT_PLANNER_PROMPT);
    }

    #[tokio::test]
    async fn load_prompts_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let config = PromptConfig {
            summary: Some(PromptSource::File {
                file: PathBuf::from("nope.txt"),
            }),
            ..Default::default()
        };
        let err = load_prompts(&config, tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_secret_and_data_dir() {
        // SAFETY: This test is single-threaded and restores the env vars immediately.
        unsafe {
            std::env::set_var("CHATRELAY_TEST_SECRET", "  sk-123 ");
            std::env::set_var("CHATRELAY_TEST_BLANK", "   ");
            std::env::set_var(DATA_DIR_ENV, "/tmp/test-chatrelay");
        }
        assert_eq!(
            env_secret("CHATRELAY_TEST_SECRET").unwrap().expose_secret(),
            "sk-123"
        );
        assert!(env_secret("CHATRELAY_TEST_BLANK").is_none());
        assert!(env_secret("CHATRELAY_TEST_UNSET_VAR").is_none());
        assert_eq!(resolve_data_dir(), PathBuf::from("/tmp/test-chatrelay"));
        unsafe {
            std::env::remove_var("CHATRELAY_TEST_SECRET");
            std::env::remove_var("CHATRELAY_TEST_BLANK");
            std::env::remove_var(DATA_DIR_ENV);
        }
    }
}
