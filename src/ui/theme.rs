use std::fs;
use std::path::Path;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::config::Config;

const BUILTIN_THEMES: &[&str] = &["default", "light"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_correct: String,
    pub text_incorrect: String,
    pub text_incorrect_bg: String,
    pub text_pending: String,
    pub text_cursor_bg: String,
    pub text_cursor_fg: String,
    pub accent: String,
    pub border: String,
    pub header_bg: String,
    pub header_fg: String,
    pub weak_bigram: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// Resolve a theme by name: a user file in `<config_dir>/themes/` wins
    /// over the built-in palettes.
    pub fn load(name: &str) -> Option<Self> {
        let user_dir = Config::config_dir().join("themes");
        if let Some(theme) = Self::load_from_dir(&user_dir, name) {
            return Some(theme);
        }
        Self::builtin(name)
    }

    fn load_from_dir(dir: &Path, name: &str) -> Option<Self> {
        let path = dir.join(format!("{name}.toml"));
        let content = fs::read_to_string(&path).ok()?;
        match toml::from_str::<Theme>(&content) {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid theme file");
                None
            }
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        let colors = match name {
            "default" => ThemeColors::default(),
            "light" => ThemeColors::light(),
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            colors,
        })
    }

    pub fn available_themes() -> Vec<String> {
        BUILTIN_THEMES.iter().map(|n| n.to_string()).collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            text_correct: "#a6e3a1".to_string(),
            text_incorrect: "#f38ba8".to_string(),
            text_incorrect_bg: "#45273a".to_string(),
            text_pending: "#6c7086".to_string(),
            text_cursor_bg: "#f5e0dc".to_string(),
            text_cursor_fg: "#1e1e2e".to_string(),
            accent: "#89b4fa".to_string(),
            border: "#45475a".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            weak_bigram: "#fab387".to_string(),
            error: "#f38ba8".to_string(),
            warning: "#f9e2af".to_string(),
            success: "#a6e3a1".to_string(),
        }
    }
}

impl ThemeColors {
    fn light() -> Self {
        Self {
            bg: "#eff1f5".to_string(),
            fg: "#4c4f69".to_string(),
            text_correct: "#40a02b".to_string(),
            text_incorrect: "#d20f39".to_string(),
            text_incorrect_bg: "#f5c2cc".to_string(),
            text_pending: "#9ca0b0".to_string(),
            text_cursor_bg: "#dc8a78".to_string(),
            text_cursor_fg: "#eff1f5".to_string(),
            accent: "#1e66f5".to_string(),
            border: "#bcc0cc".to_string(),
            header_bg: "#e6e9ef".to_string(),
            header_fg: "#4c4f69".to_string(),
            weak_bigram: "#fe640b".to_string(),
            error: "#d20f39".to_string(),
            warning: "#df8e1d".to_string(),
            success: "#40a02b".to_string(),
        }
    }

    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_correct(&self) -> Color { Self::parse_color(&self.text_correct) }
    pub fn text_incorrect(&self) -> Color { Self::parse_color(&self.text_incorrect) }
    pub fn text_incorrect_bg(&self) -> Color { Self::parse_color(&self.text_incorrect_bg) }
    pub fn text_pending(&self) -> Color { Self::parse_color(&self.text_pending) }
    pub fn text_cursor_bg(&self) -> Color { Self::parse_color(&self.text_cursor_bg) }
    pub fn text_cursor_fg(&self) -> Color { Self::parse_color(&self.text_cursor_fg) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn weak_bigram(&self) -> Color { Self::parse_color(&self.weak_bigram) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_colors() {
        assert_eq!(ThemeColors::parse_color("#ff8000"), Color::Rgb(255, 128, 0));
        assert_eq!(ThemeColors::parse_color("ff8000"), Color::Rgb(255, 128, 0));
        assert_eq!(ThemeColors::parse_color("#fff"), Color::White);
        assert_eq!(ThemeColors::parse_color("#zzzzzz"), Color::White);
    }

    #[test]
    fn builtin_themes_resolve() {
        for name in Theme::available_themes() {
            assert_eq!(Theme::builtin(&name).unwrap().name, name);
        }
        assert!(Theme::builtin("nope").is_none());
    }

    #[test]
    fn user_theme_file_fills_missing_colors() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join("mine.toml"),
            "name = \"mine\"\n[colors]\naccent = \"#010203\"\n",
        )
        .unwrap();
        let theme = Theme::load_from_dir(dir.path(), "mine").unwrap();
        assert_eq!(theme.colors.accent(), Color::Rgb(1, 2, 3));
        assert_eq!(theme.colors.bg, ThemeColors::default().bg);
    }

    #[test]
    fn invalid_theme_file_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("bad.toml"), "colors = 3").unwrap();
        assert!(Theme::load_from_dir(dir.path(), "bad").is_none());
    }
}
