//! Built-in colour themes and validation for user-defined ones.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::AuthError;

pub const MAX_CUSTOM_THEMES: usize = 20;
const MAX_THEME_NAME_LENGTH: usize = 50;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid colour regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub primary: String,
    pub background: String,
    pub surface: String,
    pub text: String,
}

impl ThemeColors {
    fn new(primary: &str, background: &str, surface: &str, text: &str) -> Self {
        Self {
            primary: primary.to_string(),
            background: background.to_string(),
            surface: surface.to_string(),
            text: text.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        for (field, value) in [
            ("primary", &self.primary),
            ("background", &self.background),
            ("surface", &self.surface),
            ("text", &self.text),
        ] {
            if !HEX_COLOR.is_match(value.trim()) {
                return Err(AuthError::InvalidTheme(format!(
                    "{field} colour must be a hex value like #1f2937"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub colors: ThemeColors,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTheme {
    pub id: String,
    pub name: String,
    pub colors: ThemeColors,
    pub created_at: DateTime<Utc>,
}

static BUILTIN_THEMES: Lazy<Vec<Theme>> = Lazy::new(|| {
    vec![
        Theme {
            id: "default-dark",
            name: "Default - Dark",
            description: "Classic dark theme with red accents",
            colors: ThemeColors::new("#ef4444", "#111827", "#1f2937", "#f9fafb"),
        },
        Theme {
            id: "default-light",
            name: "Default - Light",
            description: "Clean light theme with blue accents",
            colors: ThemeColors::new("#3b82f6", "#ffffff", "#f8fafc", "#1f2937"),
        },
        Theme {
            id: "warframe-dark",
            name: "Warframe - Dark",
            description: "Cyberpunk dark theme with cyan accents",
            colors: ThemeColors::new("#00d4ff", "#0a0a0f", "#1a1a2e", "#eee6ff"),
        },
        Theme {
            id: "warframe-light",
            name: "Warframe - Light",
            description: "Futuristic light theme with teal accents",
            colors: ThemeColors::new("#14b8a6", "#f0f9ff", "#e0f2fe", "#0f172a"),
        },
        Theme {
            id: "neon-dark",
            name: "Neon - Dark",
            description: "Vibrant neon theme with purple accents",
            colors: ThemeColors::new("#a855f7", "#0c0a1a", "#1e1b3a", "#f3e8ff"),
        },
        Theme {
            id: "forest-light",
            name: "Forest - Light",
            description: "Natural theme with green accents",
            colors: ThemeColors::new("#059669", "#f7fdf7", "#ecfdf5", "#064e3b"),
        },
    ]
});

pub fn builtin_themes() -> &'static [Theme] {
    &BUILTIN_THEMES
}

pub fn is_builtin(id: &str) -> bool {
    BUILTIN_THEMES.iter().any(|theme| theme.id == id)
}

pub(crate) fn build_custom_theme(
    name: &str,
    colors: ThemeColors,
    existing: &[CustomTheme],
) -> Result<CustomTheme, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::InvalidTheme("Theme name is required".to_string()));
    }
    if name.chars().count() > MAX_THEME_NAME_LENGTH {
        return Err(AuthError::InvalidTheme(format!(
            "Theme name must be at most {MAX_THEME_NAME_LENGTH} characters"
        )));
    }
    if existing.len() >= MAX_CUSTOM_THEMES {
        return Err(AuthError::InvalidTheme(format!(
            "At most {MAX_CUSTOM_THEMES} custom themes are allowed"
        )));
    }
    colors.validate()?;

    let colors = ThemeColors {
        primary: colors.primary.trim().to_ascii_lowercase(),
        background: colors.background.trim().to_ascii_lowercase(),
        surface: colors.surface.trim().to_ascii_lowercase(),
        text: colors.text.trim().to_ascii_lowercase(),
    };

    let slug = slugify(name);
    let mut n = 1;
    let id = loop {
        let candidate = format!("custom-{slug}-{n}");
        if !existing.iter().any(|theme| theme.id == candidate) {
            break candidate;
        }
        n += 1;
    };

    Ok(CustomTheme {
        id,
        name: name.to_string(),
        colors,
        created_at: Utc::now(),
    })
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "theme".to_string()
    } else {
        slug
    }
}
