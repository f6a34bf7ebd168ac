use crossterm::style::Color;
use serde::{Deserialize, Serialize};

use crate::ui::console::Tone;

/// Prompt colors as hex strings, configurable under `[colors]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub header: String,
    pub input: String,
    pub warning: String,
    pub text: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header: "#89b4fa".to_string(),
            input: "#a6e3a1".to_string(),
            warning: "#f38ba8".to_string(),
            text: String::new(),
        }
    }
}

impl Theme {
    /// `None` for an empty string, which leaves the terminal color alone.
    pub fn parse_color(hex: &str) -> Option<Color> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.is_empty() {
            return None;
        }
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb { r, g, b });
            }
        }
        Some(Color::White)
    }

    pub fn color(&self, tone: Tone) -> Option<Color> {
        match tone {
            Tone::Normal => Self::parse_color(&self.text),
            Tone::Header => Self::parse_color(&self.header),
            Tone::Input => Self::parse_color(&self.input),
            Tone::Warning => Self::parse_color(&self.warning),
        }
    }
}
