use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use storyline_engine::MarkupRules;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// User settings. Every field is optional in the file; an empty file gives
/// the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where relative manuscript paths are looked up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manuscripts_path: Option<PathBuf>,
    pub markup: MarkupRules,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded manuscripts path
        config.manuscripts_path = config
            .manuscripts_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/storyline");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Resolves a manuscript path given on the command line. Absolute paths
    /// and paths with no configured manuscripts directory are used as given.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let path = Self::expand_path(path).unwrap_or_else(|| path.to_path_buf());
        match &self.manuscripts_path {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use storyline_engine::BlockType;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/storyline/config.toml"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.markup, MarkupRules::default());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config {
            manuscripts_path: Some(PathBuf::from("/tmp/test-manuscripts")),
            markup: MarkupRules::default(),
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(deserialized, original);
    }

    #[test]
    fn test_partial_markup_table_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[markup.shortcuts]
"=== " = "scene_break"
"#,
        )
        .unwrap();

        assert_eq!(config.markup.shortcuts.len(), 1);
        assert_eq!(
            config.markup.shortcuts.get("=== "),
            Some(&BlockType::SceneBreak)
        );
        assert_eq!(
            config.markup.continue_after,
            MarkupRules::default().continue_after
        );
    }

    #[test]
    fn test_unknown_block_type_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[markup.shortcuts]\n\"x \" = \"chapter\"\n").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_config_with_env_var_in_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "manuscripts_path = \"$STORYLINE_TEST_ROOT/books\"\n",
        )
        .unwrap();
        unsafe {
            env::set_var("STORYLINE_TEST_ROOT", "/custom/writing");
        }

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(
            config.manuscripts_path,
            Some(PathBuf::from("/custom/writing/books"))
        );

        unsafe {
            env::remove_var("STORYLINE_TEST_ROOT");
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            manuscripts_path: Some(PathBuf::from("/tmp/test-manuscripts")),
            ..Config::default()
        };

        test_config.save_to_path(&config_file).unwrap();

        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_resolve_relative_against_manuscripts_dir() {
        let config = Config {
            manuscripts_path: Some(PathBuf::from("/books")),
            ..Config::default()
        };

        assert_eq!(
            config.resolve(Path::new("novel.json")),
            PathBuf::from("/books/novel.json")
        );
        assert_eq!(
            config.resolve(Path::new("/elsewhere/novel.json")),
            PathBuf::from("/elsewhere/novel.json")
        );
        assert_eq!(
            Config::default().resolve(Path::new("novel.json")),
            PathBuf::from("novel.json")
        );
    }
}
