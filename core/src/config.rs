use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::command::DEFAULT_PROGRAM;
use crate::options::BuildOptions;
use crate::theme::ThemeName;
use crate::Cli;

pub const CONFIG_FILE_NAME: &str = "kiln.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub build: BuildOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_program")]
    pub program: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub theme: ThemeName,
    #[serde(default = "default_max_log_lines")]
    pub max_log_lines: usize,
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_save_directory")]
    pub save_directory: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::default(),
            max_log_lines: default_max_log_lines(),
            show_timestamps: true,
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            save_directory: default_save_directory(),
        }
    }
}

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

fn default_max_log_lines() -> usize {
    10000
}

fn default_true() -> bool {
    true
}

fn default_save_directory() -> String {
    "~/.cache/kiln/logs".to_string()
}

impl Config {
    /// `--config` wins, then `./kiln.toml`, then the global file, then defaults.
    pub fn load_from_cli(cli: &Cli) -> anyhow::Result<Self> {
        if let Some(path) = &cli.config {
            let path = Self::expand_path(&path.to_string_lossy());
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Self::load_from_file(&path);
        }

        let local = std::env::current_dir()
            .context("Failed to resolve current directory")?
            .join(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::load_from_file(&local);
        }

        Self::load_from_file(Self::global_path())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = Self::expand_path(&path.as_ref().to_string_lossy());

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn global_path() -> PathBuf {
        Self::expand_path("~/.config/kiln/kiln.toml")
    }

    pub fn expand_path(path: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path);
        PathBuf::from(expanded.as_ref())
    }

    pub fn log_directory(&self) -> PathBuf {
        Self::expand_path(&self.logs.save_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.tool.program, "pyinstaller");
        assert_eq!(config.display.theme, ThemeName::Light);
        assert!(config.build.one_file);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[display]\ntheme = \"dark\"\n\n[build]\nwindowed = true\nhidden_imports = [\"numpy\"]\n",
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.display.theme, ThemeName::Dark);
        assert_eq!(config.display.max_log_lines, 10000);
        assert!(config.build.windowed);
        assert!(config.build.one_file);
        assert_eq!(config.build.hidden_imports, vec!["numpy"]);
        assert_eq!(config.tool.program, "pyinstaller");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.tool.program = "/opt/py/bin/pyinstaller".to_string();
        config.build.clean_build = true;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.tool.program, "/opt/py/bin/pyinstaller");
        assert!(loaded.build.clean_build);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[display\ntheme = ").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
