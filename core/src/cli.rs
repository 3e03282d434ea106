use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::options::{non_empty_path, resolve_app_name, BuildOptions};
use crate::theme::ThemeName;

#[derive(Parser, Debug)]
#[command(name = "kiln")]
#[command(author, version, about = "Terminal front-end for PyInstaller", long_about = None)]
pub struct Cli {
    #[arg(value_name = "SCRIPT", help = "Python script to package")]
    pub script: Option<PathBuf>,

    #[arg(short = 'n', long, value_name = "NAME", help = "Application name (defaults to the script name)")]
    pub name: Option<String>,

    #[arg(short, long, value_name = "ICON", help = "Icon file (.ico)")]
    pub icon: Option<PathBuf>,

    #[arg(long, help = "Produce a one-directory bundle instead of a single file")]
    pub onedir: bool,

    #[arg(long, conflicts_with = "onedir", help = "Produce a single-file executable")]
    pub onefile: bool,

    #[arg(short, long, help = "Do not open a console window")]
    pub windowed: bool,

    #[arg(long, conflicts_with = "windowed", help = "Open a console window")]
    pub console: bool,

    #[arg(long, value_name = "DIR", help = "Where to put the bundled app")]
    pub distpath: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Where to put temporary work files")]
    pub workpath: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Folder to store the generated spec file")]
    pub specpath: Option<PathBuf>,

    #[arg(long, help = "Clean the PyInstaller cache before building")]
    pub clean: bool,

    #[arg(long, help = "Strip symbols from the executable and shared libraries")]
    pub strip: bool,

    #[arg(long, help = "Disable UPX compression")]
    pub noupx: bool,

    #[arg(long, value_name = "DIR", help = "Directory containing the UPX binary")]
    pub upx_dir: Option<PathBuf>,

    #[arg(long = "hidden-import", value_name = "MODULE", help = "Module to import that is not visible in the code")]
    pub hidden_imports: Vec<String>,

    #[arg(long = "collect-all", value_name = "PACKAGE", help = "Collect all submodules, data and binaries of a package")]
    pub collect_all: Vec<String>,

    #[arg(long = "exclude-module", value_name = "MODULE", help = "Module to leave out of the bundle")]
    pub exclude_modules: Vec<String>,

    #[arg(long, help = "Skip TUI and stream the build to stdout")]
    pub no_tui: bool,

    #[arg(long, help = "Print the PyInstaller command without running it")]
    pub dry_run: bool,

    #[arg(long, value_name = "FILE", help = "Write a JSON build report")]
    pub report: Option<PathBuf>,

    #[arg(long, value_enum, help = "Color theme")]
    pub theme: Option<ThemeName>,

    #[arg(long, value_name = "FILE", help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Initialize a new kiln.toml configuration")]
    Init {
        #[arg(long, help = "Overwrite an existing kiln.toml")]
        force: bool,
    },
}

impl Cli {
    /// Layers the command-line flags over the `[build]` defaults from config.
    pub fn build_options(&self, defaults: &BuildOptions) -> BuildOptions {
        let mut options = defaults.clone();

        if let Some(script) = &self.script {
            options.script_path = script.clone();
        }

        // A blank `-n` counts as no name at all.
        options.app_name = match self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(name) => name.to_string(),
            None => resolve_app_name(&options.app_name, &options.script_path),
        };

        if self.onedir {
            options.one_file = false;
        } else if self.onefile {
            options.one_file = true;
        }

        if self.windowed {
            options.windowed = true;
        } else if self.console {
            options.windowed = false;
        }

        let overrides = [
            (&self.icon, &mut options.icon_path),
            (&self.distpath, &mut options.dist_path),
            (&self.workpath, &mut options.work_path),
            (&self.specpath, &mut options.spec_path),
            (&self.upx_dir, &mut options.upx_dir),
        ];
        for (flag, field) in overrides {
            if let Some(path) = flag {
                *field = non_empty_path(path.clone());
            }
        }

        options.clean_build |= self.clean;
        options.strip_binaries |= self.strip;
        options.disable_upx |= self.noupx;

        options.hidden_imports.extend(self.hidden_imports.iter().cloned());
        options
            .collect_all_packages
            .extend(self.collect_all.iter().cloned());
        options
            .excluded_modules
            .extend(self.exclude_modules.iter().cloned());

        options.normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::parse_from([
            "kiln",
            "main.py",
            "-n",
            "Tool",
            "--onedir",
            "--windowed",
            "--noupx",
            "--hidden-import",
            "numpy",
            "--hidden-import",
            "pandas",
            "--exclude-module",
            "tkinter",
        ]);
        let options = cli.build_options(&BuildOptions::default());

        assert_eq!(options.script_path, PathBuf::from("main.py"));
        assert_eq!(options.app_name, "Tool");
        assert!(!options.one_file);
        assert!(options.windowed);
        assert!(options.disable_upx);
        assert_eq!(options.hidden_imports, vec!["numpy", "pandas"]);
        assert_eq!(options.excluded_modules, vec!["tkinter"]);
    }

    #[test]
    fn test_blank_name_falls_back_to_script_stem() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("build_me.py");
        std::fs::write(&script, "print('hi')").unwrap();
        let script_arg = script.to_string_lossy().to_string();

        for blank in ["", "   "] {
            let cli = Cli::parse_from(["kiln", script_arg.as_str(), "-n", blank]);
            let options = cli.build_options(&BuildOptions::default());

            assert_eq!(options.app_name, "build_me");
            assert!(options.validate().is_ok());
        }
    }

    #[test]
    fn test_config_defaults_are_overlaid() {
        let defaults = BuildOptions {
            windowed: true,
            clean_build: true,
            hidden_imports: vec!["yaml".to_string()],
            ..BuildOptions::default()
        };
        let cli = Cli::parse_from(["kiln", "app.py", "--console", "--hidden-import", "toml"]);
        let options = cli.build_options(&defaults);

        assert!(!options.windowed);
        assert!(options.clean_build);
        assert_eq!(options.hidden_imports, vec!["yaml", "toml"]);
    }

    #[test]
    fn test_name_defaults_to_script_stem() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("build_me.py");
        std::fs::write(&script, "").unwrap();

        let cli = Cli::parse_from(["kiln".into(), script.into_os_string()]);
        assert_eq!(cli.build_options(&BuildOptions::default()).app_name, "build_me");
    }

    #[test]
    fn test_conflicting_modes_are_rejected() {
        assert!(Cli::try_parse_from(["kiln", "a.py", "--onedir", "--onefile"]).is_err());
        assert!(Cli::try_parse_from(["kiln", "a.py", "--windowed", "--console"]).is_err());
    }

    #[test]
    fn test_init_subcommand() {
        let cli = Cli::parse_from(["kiln", "init", "--force"]);
        assert!(matches!(cli.command, Some(Commands::Init { force: true })));
    }
}
