use anyhow::bail;

use super::structure::{AppConfigInner, AppConfigToml};
use std::{
    ops::{Deref, DerefMut},
    path::PathBuf,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub path: PathBuf,
    cached: AppConfigToml,
}

impl AppConfig {
    pub fn read(path: PathBuf) -> Result<Self, anyhow::Error> {
        let path = match path.is_dir() {
            true => path.join("config.toml"),
            false => path,
        };

        if !path.exists() {
            return Self::new(path);
        }

        if !path.is_file() {
            bail!(
                "Given path exists and is not a file... either change the path or delete the file."
            );
        }

        let config_str = std::fs::read_to_string(&path)?;

        let mut config = Self {
            path,
            cached: toml::from_str(&config_str)?,
        };
        config.cached.config.apply_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    fn new(path: PathBuf) -> Result<Self, anyhow::Error> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut config = Self {
            path,
            cached: AppConfigToml::default(),
        };

        config.save()?;
        config.cached.config.apply_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        std::fs::write(&self.path, toml::to_string(&self.cached)?)?;

        Ok(())
    }
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.cached.config
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cached.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [config.server]
        port = 9000

        [config.vector]
        host = "qdrant.internal"
        collection = "films"

        [config.embedding]
        provider = "openai"
        api_key = "file-key"
        model = "text-embedding-3-small"

        [config.llm]
        api_key = "file-groq-key"
        model = "llama-3.1-8b-instant"
        max_tokens = 150
    "#;

    #[test]
    fn parses_full_config() {
        let parsed: AppConfigToml = toml::from_str(SAMPLE).unwrap();
        let config = parsed.config;

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.vector.host, "qdrant.internal");
        assert_eq!(config.vector.collection, "films");
        assert_eq!(config.llm.max_tokens, Some(150));
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: AppConfigToml = toml::from_str("[config]\n").unwrap();
        let config = parsed.config;

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.vector.collection, "movies");
        assert!(config.llm.api_key.is_empty());
    }

    #[test]
    fn env_overrides_take_precedence() {
        let parsed: AppConfigToml = toml::from_str(SAMPLE).unwrap();
        let mut config = parsed.config;

        config.apply_overrides(|key| match key {
            "GROQ_API_KEY" => Some("env-groq-key".to_string()),
            "QDRANT_HOST" => Some("qdrant.prod".to_string()),
            "MOVIEBOT_PORT" => Some("8000".to_string()),
            _ => None,
        });

        assert_eq!(config.llm.api_key, "env-groq-key");
        assert_eq!(config.vector.host, "qdrant.prod");
        assert_eq!(config.server.port, 8000);
        // untouched by the lookup above
        assert_eq!(config.embedding.api_key, "file-key");
    }

    #[test]
    fn unparsable_env_port_is_ignored() {
        let mut config = AppConfigInner::default();

        config.apply_overrides(|key| match key {
            "MOVIEBOT_PORT" => Some("not-a-port".to_string()),
            _ => None,
        });

        assert_eq!(config.server.port, 8000);
    }
}
