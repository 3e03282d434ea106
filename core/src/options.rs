use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PLACEHOLDER_APP_NAME: &str = "MyApp";

/// One build request. Constructed fresh for every build and handed to the
/// command builder by value; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub script_path: PathBuf,
    pub app_name: String,
    pub icon_path: Option<PathBuf>,
    pub dist_path: Option<PathBuf>,
    pub work_path: Option<PathBuf>,
    pub spec_path: Option<PathBuf>,
    pub one_file: bool,
    pub windowed: bool,
    pub clean_build: bool,
    pub strip_binaries: bool,
    pub disable_upx: bool,
    pub upx_dir: Option<PathBuf>,
    pub hidden_imports: Vec<String>,
    pub collect_all_packages: Vec<String>,
    pub excluded_modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a Python script to build.")]
    MissingScript,
    #[error("The script '{}' does not exist.", .0.display())]
    ScriptNotFound(PathBuf),
    #[error("The application name must not be empty.")]
    EmptyAppName,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            script_path: PathBuf::new(),
            app_name: PLACEHOLDER_APP_NAME.to_string(),
            icon_path: None,
            dist_path: None,
            work_path: None,
            spec_path: None,
            one_file: true,
            windowed: false,
            clean_build: false,
            strip_binaries: false,
            disable_upx: false,
            upx_dir: None,
            hidden_imports: Vec::new(),
            collect_all_packages: Vec::new(),
            excluded_modules: Vec::new(),
        }
    }
}

impl BuildOptions {
    pub fn new<P: Into<PathBuf>>(script_path: P) -> Self {
        let script_path = script_path.into();
        let app_name = resolve_app_name(PLACEHOLDER_APP_NAME, &script_path);
        Self {
            script_path,
            app_name,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.script_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingScript);
        }

        if !self.script_path.exists() {
            return Err(ValidationError::ScriptNotFound(self.script_path.clone()));
        }

        if self.app_name.trim().is_empty() {
            return Err(ValidationError::EmptyAppName);
        }

        Ok(())
    }

    /// Blank optional paths collapse to `None` so "set" always means non-empty.
    pub fn normalized(mut self) -> Self {
        self.icon_path = self.icon_path.and_then(non_empty_path);
        self.dist_path = self.dist_path.and_then(non_empty_path);
        self.work_path = self.work_path.and_then(non_empty_path);
        self.spec_path = self.spec_path.and_then(non_empty_path);
        self.upx_dir = self.upx_dir.and_then(non_empty_path);
        self.app_name = self.app_name.trim().to_string();
        self
    }
}

pub fn non_empty_path<P: Into<PathBuf>>(path: P) -> Option<PathBuf> {
    let path = path.into();
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        None
    } else {
        Some(path)
    }
}

/// Splits newline-separated module names, trimming each and dropping blanks.
pub fn parse_module_list(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Replaces a blank or placeholder application name with the script's file
/// stem, provided the script exists on disk.
pub fn resolve_app_name(current: &str, script: &Path) -> String {
    let current = current.trim();
    if !current.is_empty() && current != PLACEHOLDER_APP_NAME {
        return current.to_string();
    }

    if script.is_file() {
        if let Some(stem) = script.file_stem() {
            return stem.to_string_lossy().to_string();
        }
    }

    PLACEHOLDER_APP_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form() {
        let options = BuildOptions::default();
        assert!(options.one_file);
        assert!(!options.windowed);
        assert_eq!(options.app_name, "MyApp");
        assert!(options.upx_dir.is_none());
    }

    #[test]
    fn test_parse_module_list_trims_and_drops_blanks() {
        let modules = parse_module_list("  numpy \n\n pandas\r\n   \nscipy");
        assert_eq!(modules, vec!["numpy", "pandas", "scipy"]);
        assert!(parse_module_list("").is_empty());
    }

    #[test]
    fn test_resolve_app_name_uses_stem_for_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("build_me.py");
        std::fs::write(&script, "print('hi')").unwrap();

        assert_eq!(resolve_app_name("MyApp", &script), "build_me");
        assert_eq!(resolve_app_name("   ", &script), "build_me");
        assert_eq!(resolve_app_name("Custom", &script), "Custom");
    }

    #[test]
    fn test_resolve_app_name_keeps_placeholder_for_missing_script() {
        let script = Path::new("/definitely/not/here.py");
        assert_eq!(resolve_app_name("", script), "MyApp");
        assert_eq!(resolve_app_name("MyApp", script), "MyApp");
    }

    #[test]
    fn test_validate_rejects_missing_script() {
        let options = BuildOptions::default();
        assert_eq!(options.validate(), Err(ValidationError::MissingScript));

        let options = BuildOptions::new("/no/such/script.py");
        assert_eq!(
            options.validate(),
            Err(ValidationError::ScriptNotFound(PathBuf::from(
                "/no/such/script.py"
            )))
        );
    }

    #[test]
    fn test_validate_ignores_missing_icon() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("app.py");
        std::fs::write(&script, "").unwrap();

        let mut options = BuildOptions::new(&script);
        options.icon_path = Some(dir.path().join("missing.ico"));
        assert!(options.validate().is_ok());
        assert_eq!(options.app_name, "app");
    }

    #[test]
    fn test_normalized_drops_blank_paths() {
        let options = BuildOptions {
            icon_path: Some(PathBuf::from("  ")),
            upx_dir: Some(PathBuf::new()),
            dist_path: Some(PathBuf::from("out")),
            app_name: " Spaced ".to_string(),
            ..BuildOptions::default()
        }
        .normalized();

        assert!(options.icon_path.is_none());
        assert!(options.upx_dir.is_none());
        assert_eq!(options.dist_path, Some(PathBuf::from("out")));
        assert_eq!(options.app_name, "Spaced");
    }
}
