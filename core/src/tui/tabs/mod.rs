pub mod console;
pub mod form;

use super::form::FieldId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabId {
    Basic = 0,
    Advanced = 1,
    Packages = 2,
}

const TAB_COUNT: usize = 3;

impl TabId {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(TabId::Basic),
            1 => Some(TabId::Advanced),
            2 => Some(TabId::Packages),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Self {
        Self::from_index((self.index() + 1) % TAB_COUNT).unwrap_or(TabId::Basic)
    }

    pub fn prev(&self) -> Self {
        let prev_index = if self.index() == 0 {
            TAB_COUNT - 1
        } else {
            self.index() - 1
        };
        Self::from_index(prev_index).unwrap_or(TabId::Basic)
    }

    pub fn title(&self) -> &'static str {
        match self {
            TabId::Basic => "Basic",
            TabId::Advanced => "Advanced",
            TabId::Packages => "Packages",
        }
    }

    pub fn fields(&self) -> &'static [FieldId] {
        match self {
            TabId::Basic => &[
                FieldId::Script,
                FieldId::AppName,
                FieldId::Icon,
                FieldId::DistPath,
                FieldId::WorkPath,
                FieldId::SpecPath,
                FieldId::OneFile,
                FieldId::Windowed,
            ],
            TabId::Advanced => &[
                FieldId::Clean,
                FieldId::Strip,
                FieldId::UpxDir,
                FieldId::DisableUpx,
            ],
            TabId::Packages => &[
                FieldId::HiddenImports,
                FieldId::CollectAll,
                FieldId::ExcludeModules,
            ],
        }
    }

    pub fn all() -> [TabId; TAB_COUNT] {
        [TabId::Basic, TabId::Advanced, TabId::Packages]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycling() {
        assert_eq!(TabId::Basic.next(), TabId::Advanced);
        assert_eq!(TabId::Packages.next(), TabId::Basic);
        assert_eq!(TabId::Basic.prev(), TabId::Packages);
    }

    #[test]
    fn test_every_field_belongs_to_one_tab() {
        let fields: Vec<FieldId> = TabId::all()
            .iter()
            .flat_map(|tab| tab.fields().iter().copied())
            .collect();
        let unique: std::collections::HashSet<FieldId> = fields.iter().copied().collect();
        assert_eq!(unique.len(), fields.len());
        assert_eq!(fields.len(), FieldId::ALL.len());
    }
}
