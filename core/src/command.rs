use std::fmt;
use std::path::{Path, PathBuf};

use crate::options::BuildOptions;
use crate::parser::entry::{LogEntry, LogLevel};

pub const DEFAULT_PROGRAM: &str = "pyinstaller";

/// Argument vector for one packaging run together with the configuration
/// log, in the order the arguments were appended.
#[derive(Debug, Clone)]
pub struct BuildCommand {
    pub args: Vec<String>,
    pub log: Vec<LogEntry>,
}

impl BuildCommand {
    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    fn push_arg(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    fn push_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log.push(LogEntry::tagged(level, message));
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.args.iter().map(|arg| shell_quote(arg)).collect();
        write!(f, "{}", quoted.join(" "))
    }
}

#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl CommandBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn build(&self, options: &BuildOptions) -> BuildCommand {
        let mut cmd = BuildCommand {
            args: vec![self.program.clone()],
            log: Vec::new(),
        };

        if options.one_file {
            cmd.push_arg("--onefile");
            cmd.push_log(LogLevel::Config, "One-file mode enabled");
        } else {
            cmd.push_arg("--onedir");
            cmd.push_log(LogLevel::Config, "One-directory mode enabled");
        }

        if options.windowed {
            cmd.push_arg("--windowed");
            cmd.push_log(LogLevel::Config, "Windowed mode enabled");
        } else {
            cmd.push_arg("--console");
            cmd.push_log(LogLevel::Config, "Console mode enabled");
        }

        if let Some(icon) = &options.icon_path {
            if icon.is_file() {
                cmd.push_arg("--icon");
                cmd.push_arg(path_arg(icon));
                cmd.push_log(LogLevel::Config, format!("Icon: {}", icon.display()));
            } else {
                cmd.push_log(
                    LogLevel::Warning,
                    format!(
                        "Icon file not found at: {}. Build will proceed with the default icon.",
                        icon.display()
                    ),
                );
            }
        }

        cmd.push_arg("-n");
        cmd.push_arg(options.app_name.clone());
        cmd.push_log(
            LogLevel::Config,
            format!("Output name: {}", options.app_name),
        );

        let output_dirs = [
            ("--distpath", "Distribution path", &options.dist_path),
            ("--workpath", "Work path", &options.work_path),
            ("--specpath", "Spec path", &options.spec_path),
        ];
        for (flag, label, path) in output_dirs {
            if let Some(path) = path {
                cmd.push_arg(flag);
                cmd.push_arg(path_arg(path));
                cmd.push_log(LogLevel::Config, format!("{}: {}", label, path.display()));
            }
        }

        if options.clean_build {
            cmd.push_arg("--clean");
            cmd.push_log(LogLevel::Config, "Clean build enabled");
        }

        if options.strip_binaries {
            cmd.push_arg("--strip");
            cmd.push_log(LogLevel::Config, "Binary stripping enabled");
        }

        if let Some(upx_dir) = &options.upx_dir {
            cmd.push_arg(format!("--upx-dir={}", path_arg(upx_dir)));
            cmd.push_log(LogLevel::Config, format!("UPX directory: {}", upx_dir.display()));
        } else if options.disable_upx {
            cmd.push_arg("--noupx");
            cmd.push_log(LogLevel::Config, "UPX disabled");
        }

        let module_lists = [
            ("--hidden-import", "Hidden imports", &options.hidden_imports),
            ("--collect-all", "Collect all", &options.collect_all_packages),
            ("--exclude-module", "Excluded modules", &options.excluded_modules),
        ];
        for (flag, label, names) in module_lists {
            if names.is_empty() {
                continue;
            }
            for name in names {
                cmd.push_arg(flag);
                cmd.push_arg(name.clone());
            }
            cmd.push_log(LogLevel::Config, format!("{}: {}", label, names.join(", ")));
        }

        cmd.push_arg(path_arg(&options.script_path));
        cmd.push_log(
            LogLevel::Config,
            format!("Script: {}", options.script_path.display()),
        );

        cmd
    }
}

/// Recovers the options encoded in an argument vector produced by
/// [`CommandBuilder::build`]. The first element is the program and is skipped;
/// the last element is the script. Unknown tokens are ignored.
pub fn parse_command(args: &[String]) -> BuildOptions {
    let mut options = BuildOptions {
        script_path: PathBuf::new(),
        ..BuildOptions::default()
    };

    let Some((script, flags)) = args.get(1..).and_then(|rest| rest.split_last()) else {
        return options;
    };
    options.script_path = PathBuf::from(script);

    let mut iter = flags.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--onefile" | "-F" => options.one_file = true,
            "--onedir" | "-D" => options.one_file = false,
            "--windowed" | "-w" | "--noconsole" => options.windowed = true,
            "--console" | "-c" => options.windowed = false,
            "--clean" => options.clean_build = true,
            "--strip" | "-s" => options.strip_binaries = true,
            "--noupx" => options.disable_upx = true,
            "--icon" | "-i" => options.icon_path = iter.next().map(PathBuf::from),
            "-n" | "--name" => {
                if let Some(name) = iter.next() {
                    options.app_name = name.clone();
                }
            }
            "--distpath" => options.dist_path = iter.next().map(PathBuf::from),
            "--workpath" => options.work_path = iter.next().map(PathBuf::from),
            "--specpath" => options.spec_path = iter.next().map(PathBuf::from),
            "--hidden-import" => options.hidden_imports.extend(iter.next().cloned()),
            "--collect-all" => options.collect_all_packages.extend(iter.next().cloned()),
            "--exclude-module" => options.excluded_modules.extend(iter.next().cloned()),
            other => {
                if let Some(dir) = other.strip_prefix("--upx-dir=") {
                    options.upx_dir = Some(PathBuf::from(dir));
                }
            }
        }
    }

    options
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn shell_quote(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '$' | '`' | '\\' | '&' | ';' | '|'));

    if needs_quotes {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}
