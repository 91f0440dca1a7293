//! Light/dark theme flag and the particle palette derived from it

use crate::core::surface::Rgba;

/// Storage key and `<html>` attribute used to persist the theme
pub const STORAGE_KEY: &str = "theme";
pub const THEME_ATTR: &str = "data-theme";

/// Indigo accents for both themes.
/// Line colors are opaque here; the renderer sets alpha per edge.
pub mod colors {
    use super::Rgba;

    // === Dark theme (lighter indigo on dark background) ===
    pub const DARK_NODE: Rgba = Rgba::new(139, 152, 232, 0.45);
    pub const DARK_LINE: Rgba = Rgba::opaque(139, 152, 232);
    pub const DARK_GLOW: Rgba = Rgba::new(139, 152, 232, 0.6);
    pub const DARK_GLOW_LINE: Rgba = Rgba::opaque(139, 152, 232);

    // === Light theme (deeper indigo, lower alpha) ===
    pub const LIGHT_NODE: Rgba = Rgba::new(91, 106, 191, 0.3);
    pub const LIGHT_LINE: Rgba = Rgba::opaque(91, 106, 191);
    pub const LIGHT_GLOW: Rgba = Rgba::new(91, 106, 191, 0.45);
    pub const LIGHT_GLOW_LINE: Rgba = Rgba::opaque(91, 106, 191);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Read the attribute value; anything but "dark" is light
    pub fn from_attr(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Initial theme: stored preference, then OS preference, then light
    pub fn resolve(stored: Option<&str>, prefers_dark: bool) -> Self {
        match stored {
            Some(value) if !value.is_empty() => Theme::from_attr(value),
            _ if prefers_dark => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

/// The four colors the particle field draws with
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub node: Rgba,
    pub line: Rgba,
    pub glow: Rgba,
    pub glow_line: Rgba,
}

impl Palette {
    pub const fn for_theme(theme: Theme) -> Self {
        use colors::*;

        match theme {
            Theme::Dark => Self {
                node: DARK_NODE,
                line: DARK_LINE,
                glow: DARK_GLOW,
                glow_line: DARK_GLOW_LINE,
            },
            Theme::Light => Self {
                node: LIGHT_NODE,
                line: LIGHT_LINE,
                glow: LIGHT_GLOW,
                glow_line: LIGHT_GLOW_LINE,
            },
        }
    }
}
