use std::path::{Path, PathBuf};

use crate::options::{non_empty_path, parse_module_list, resolve_app_name, BuildOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Script,
    AppName,
    Icon,
    DistPath,
    WorkPath,
    SpecPath,
    OneFile,
    Windowed,
    Clean,
    Strip,
    UpxDir,
    DisableUpx,
    HiddenImports,
    CollectAll,
    ExcludeModules,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    MultiLine,
    Toggle,
}

impl FieldId {
    pub const ALL: [FieldId; 15] = [
        FieldId::Script,
        FieldId::AppName,
        FieldId::Icon,
        FieldId::DistPath,
        FieldId::WorkPath,
        FieldId::SpecPath,
        FieldId::OneFile,
        FieldId::Windowed,
        FieldId::Clean,
        FieldId::Strip,
        FieldId::UpxDir,
        FieldId::DisableUpx,
        FieldId::HiddenImports,
        FieldId::CollectAll,
        FieldId::ExcludeModules,
    ];

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldId::OneFile
            | FieldId::Windowed
            | FieldId::Clean
            | FieldId::Strip
            | FieldId::DisableUpx => FieldKind::Toggle,
            FieldId::HiddenImports | FieldId::CollectAll | FieldId::ExcludeModules => {
                FieldKind::MultiLine
            }
            _ => FieldKind::Text,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldId::Script => "Script Path",
            FieldId::AppName => "Application Name",
            FieldId::Icon => "Icon (.ico)",
            FieldId::DistPath => "Dist Path (Output)",
            FieldId::WorkPath => "Build Path (Work)",
            FieldId::SpecPath => "Spec Path",
            FieldId::OneFile => "One-File Executable",
            FieldId::Windowed => "Windowed (No Console)",
            FieldId::Clean => "Clean Build",
            FieldId::Strip => "Strip Binaries",
            FieldId::UpxDir => "UPX Directory",
            FieldId::DisableUpx => "Disable UPX",
            FieldId::HiddenImports => "Hidden Imports",
            FieldId::CollectAll => "Collect All",
            FieldId::ExcludeModules => "Exclude Modules",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            FieldId::Script => "path/to/main.py",
            FieldId::Icon => "optional, path/to/app.ico",
            FieldId::DistPath | FieldId::WorkPath | FieldId::SpecPath => "optional directory",
            FieldId::UpxDir => "optional, overrides Disable UPX",
            FieldId::Clean => "Remove PyInstaller cache and temporary files before building",
            FieldId::Strip => "Apply a symbol-table strip to the executable and shared libraries",
            FieldId::HiddenImports => "e.g. numpy, pandas. A new module on each line.",
            FieldId::CollectAll => "e.g. sklearn, scipy. A new package on each line.",
            FieldId::ExcludeModules => "e.g. tkinter, tests. A new module on each line.",
            _ => "",
        }
    }
}

/// Editable form contents. Text fields hold exactly what the user typed; the
/// conversion into [`BuildOptions`] happens on every build request.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    script: String,
    app_name: String,
    icon: String,
    dist_path: String,
    work_path: String,
    spec_path: String,
    upx_dir: String,
    one_file: bool,
    windowed: bool,
    clean: bool,
    strip: bool,
    disable_upx: bool,
    hidden_imports: String,
    collect_all: String,
    exclude_modules: String,
}

fn path_text(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

impl FormState {
    pub fn from_options(options: &BuildOptions) -> Self {
        Self {
            script: options.script_path.display().to_string(),
            app_name: options.app_name.clone(),
            icon: path_text(&options.icon_path),
            dist_path: path_text(&options.dist_path),
            work_path: path_text(&options.work_path),
            spec_path: path_text(&options.spec_path),
            upx_dir: path_text(&options.upx_dir),
            one_file: options.one_file,
            windowed: options.windowed,
            clean: options.clean_build,
            strip: options.strip_binaries,
            disable_upx: options.disable_upx,
            hidden_imports: options.hidden_imports.join("\n"),
            collect_all: options.collect_all_packages.join("\n"),
            exclude_modules: options.excluded_modules.join("\n"),
        }
    }

    pub fn to_options(&self) -> BuildOptions {
        let app_name = match self.app_name.trim() {
            "" => resolve_app_name("", Path::new(self.script.trim())),
            name => name.to_string(),
        };

        BuildOptions {
            script_path: PathBuf::from(self.script.trim()),
            app_name,
            icon_path: non_empty_path(self.icon.trim()),
            dist_path: non_empty_path(self.dist_path.trim()),
            work_path: non_empty_path(self.work_path.trim()),
            spec_path: non_empty_path(self.spec_path.trim()),
            one_file: self.one_file,
            windowed: self.windowed,
            clean_build: self.clean,
            strip_binaries: self.strip,
            disable_upx: self.disable_upx,
            upx_dir: non_empty_path(self.upx_dir.trim()),
            hidden_imports: parse_module_list(&self.hidden_imports),
            collect_all_packages: parse_module_list(&self.collect_all),
            excluded_modules: parse_module_list(&self.exclude_modules),
        }
    }

    pub fn text(&self, id: FieldId) -> Option<&str> {
        let value = match id {
            FieldId::Script => &self.script,
            FieldId::AppName => &self.app_name,
            FieldId::Icon => &self.icon,
            FieldId::DistPath => &self.dist_path,
            FieldId::WorkPath => &self.work_path,
            FieldId::SpecPath => &self.spec_path,
            FieldId::UpxDir => &self.upx_dir,
            FieldId::HiddenImports => &self.hidden_imports,
            FieldId::CollectAll => &self.collect_all,
            FieldId::ExcludeModules => &self.exclude_modules,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn text_mut(&mut self, id: FieldId) -> Option<&mut String> {
        let value = match id {
            FieldId::Script => &mut self.script,
            FieldId::AppName => &mut self.app_name,
            FieldId::Icon => &mut self.icon,
            FieldId::DistPath => &mut self.dist_path,
            FieldId::WorkPath => &mut self.work_path,
            FieldId::SpecPath => &mut self.spec_path,
            FieldId::UpxDir => &mut self.upx_dir,
            FieldId::HiddenImports => &mut self.hidden_imports,
            FieldId::CollectAll => &mut self.collect_all,
            FieldId::ExcludeModules => &mut self.exclude_modules,
            _ => return None,
        };
        Some(value)
    }

    pub fn flag(&self, id: FieldId) -> Option<bool> {
        match id {
            FieldId::OneFile => Some(self.one_file),
            FieldId::Windowed => Some(self.windowed),
            FieldId::Clean => Some(self.clean),
            FieldId::Strip => Some(self.strip),
            FieldId::DisableUpx => Some(self.disable_upx),
            _ => None,
        }
    }

    pub fn toggle(&mut self, id: FieldId) {
        let flag = match id {
            FieldId::OneFile => &mut self.one_file,
            FieldId::Windowed => &mut self.windowed,
            FieldId::Clean => &mut self.clean,
            FieldId::Strip => &mut self.strip,
            FieldId::DisableUpx => &mut self.disable_upx,
            _ => return,
        };
        *flag = !*flag;
    }

    pub fn insert_char(&mut self, id: FieldId, c: char) {
        if let Some(value) = self.text_mut(id) {
            value.push(c);
        }
        self.after_edit(id);
    }

    pub fn backspace(&mut self, id: FieldId) {
        if let Some(value) = self.text_mut(id) {
            value.pop();
        }
        self.after_edit(id);
    }

    pub fn clear(&mut self, id: FieldId) {
        if let Some(value) = self.text_mut(id) {
            value.clear();
        }
        self.after_edit(id);
    }

    /// Whether the upx directory currently overrides the disable toggle.
    pub fn upx_dir_overrides(&self) -> bool {
        !self.upx_dir.trim().is_empty()
    }

    fn after_edit(&mut self, id: FieldId) {
        if id == FieldId::Script {
            self.app_name = resolve_app_name(&self.app_name, Path::new(self.script.trim()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(form: &mut FormState, id: FieldId, text: &str) {
        for c in text.chars() {
            form.insert_char(id, c);
        }
    }

    #[test]
    fn test_round_trip_through_options() {
        let options = BuildOptions {
            script_path: PathBuf::from("main.py"),
            app_name: "Tool".to_string(),
            upx_dir: Some(PathBuf::from("/opt/upx")),
            hidden_imports: vec!["numpy".into(), "pandas".into()],
            windowed: true,
            ..BuildOptions::default()
        };

        assert_eq!(FormState::from_options(&options).to_options(), options);
    }

    #[test]
    fn test_module_lists_are_parsed() {
        let mut form = FormState::from_options(&BuildOptions::default());
        type_text(&mut form, FieldId::HiddenImports, " numpy\n\n pandas \n");

        assert_eq!(form.to_options().hidden_imports, vec!["numpy", "pandas"]);
    }

    #[test]
    fn test_script_autofills_placeholder_name() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("build_me.py");
        std::fs::write(&script, "").unwrap();

        let mut form = FormState::from_options(&BuildOptions::default());
        type_text(&mut form, FieldId::Script, &script.display().to_string());
        assert_eq!(form.text(FieldId::AppName), Some("build_me"));

        form.clear(FieldId::AppName);
        type_text(&mut form, FieldId::AppName, "Custom");
        form.backspace(FieldId::Script);
        type_text(&mut form, FieldId::Script, "y");
        assert_eq!(form.text(FieldId::AppName), Some("Custom"));
    }

    #[test]
    fn test_toggle_only_affects_flags() {
        let mut form = FormState::from_options(&BuildOptions::default());
        assert_eq!(form.flag(FieldId::OneFile), Some(true));

        form.toggle(FieldId::OneFile);
        form.toggle(FieldId::Script);
        assert_eq!(form.flag(FieldId::OneFile), Some(false));
        assert_eq!(form.flag(FieldId::Script), None);
        assert!(!form.to_options().one_file);
    }

    #[test]
    fn test_blank_paths_become_none() {
        let mut form = FormState::from_options(&BuildOptions::default());
        type_text(&mut form, FieldId::Icon, "   ");
        assert!(form.to_options().icon_path.is_none());
        assert!(!form.upx_dir_overrides());
    }
}
