use clap::ValueEnum;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parser::entry::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
}

impl ThemeName {
    pub fn toggle(self) -> Self {
        match self {
            ThemeName::Light => ThemeName::Dark,
            ThemeName::Dark => ThemeName::Light,
        }
    }

    pub fn palette(self) -> &'static Palette {
        Palette::for_theme(self)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(ThemeName::Light),
            "dark" => Some(ThemeName::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
        };

        write!(f, "{value}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg_base: Color,
    pub bg_raised: Color,
    pub bg_sunken: Color,
    pub border: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_disabled: Color,
    pub primary: Color,
    pub text_on_primary: Color,
    pub primary_disabled: Color,
    pub success: Color,
    pub info: Color,
    pub warning: Color,
    pub error: Color,
    pub process: Color,
    pub config: Color,
}

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

static LIGHT: Palette = Palette {
    bg_base: hex(0xF8F9FA),
    bg_raised: hex(0xFFFFFF),
    bg_sunken: hex(0xE9ECEF),
    border: hex(0xDEE2E6),
    text: hex(0x212529),
    text_dim: hex(0x6C757D),
    text_disabled: hex(0xADB5BD),
    primary: hex(0x0D6EFD),
    text_on_primary: hex(0xFFFFFF),
    primary_disabled: hex(0xE9ECEF),
    success: hex(0x198754),
    info: hex(0x0DCAF0),
    warning: hex(0xFFC107),
    error: hex(0xDC3545),
    process: hex(0x6F42C1),
    config: hex(0x6C757D),
};

static DARK: Palette = Palette {
    bg_base: hex(0x212529),
    bg_raised: hex(0x343A40),
    bg_sunken: hex(0x191C1F),
    border: hex(0x495057),
    text: hex(0xF8F9FA),
    text_dim: hex(0xADB5BD),
    text_disabled: hex(0x6C757D),
    primary: hex(0x0D6EFD),
    text_on_primary: hex(0xFFFFFF),
    primary_disabled: hex(0x343A40),
    success: hex(0x198754),
    info: hex(0x0DCAF0),
    warning: hex(0xFFC107),
    error: hex(0xDC3545),
    process: hex(0x6F42C1),
    config: hex(0xADB5BD),
};

impl Palette {
    pub fn for_theme(theme: ThemeName) -> &'static Palette {
        match theme {
            ThemeName::Light => &LIGHT,
            ThemeName::Dark => &DARK,
        }
    }

    pub fn level_color(&self, level: LogLevel) -> Color {
        match level {
            LogLevel::Debug => self.text_disabled,
            LogLevel::Config => self.config,
            LogLevel::Info => self.info,
            LogLevel::Process => self.process,
            LogLevel::Success => self.success,
            LogLevel::Warning => self.warning,
            LogLevel::Error => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(ThemeName::Light.toggle(), ThemeName::Dark);
        assert_eq!(ThemeName::Dark.toggle().toggle(), ThemeName::Dark);
    }

    #[test]
    fn test_palette_lookup() {
        let dark = ThemeName::Dark.palette();
        assert_eq!(dark.bg_base, Color::Rgb(0x21, 0x25, 0x29));
        assert_eq!(dark.level_color(LogLevel::Error), Color::Rgb(0xDC, 0x35, 0x45));

        let light = Palette::for_theme(ThemeName::Light);
        assert_eq!(light.text, Color::Rgb(0x21, 0x25, 0x29));
        assert_ne!(light.config, dark.config);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(ThemeName::parse(" Dark "), Some(ThemeName::Dark));
        assert_eq!(ThemeName::parse("solarized"), None);
        assert_eq!(ThemeName::Light.to_string(), "light");
    }
}
