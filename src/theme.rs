use serde::Deserialize;

const DEFAULT_BACKGROUND: &str = "#ffffff";
const DEFAULT_FOREGROUND: &str = "#24292f";

/// Canvas colors for the CLI, loadable from Alacritty theme files.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background_color: String,
    pub text_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND.to_string(),
            text_color: DEFAULT_FOREGROUND.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlacrittyTheme {
    colors: AlacrittyColors,
}

#[derive(Debug, Deserialize)]
struct AlacrittyColors {
    primary: AlacrittyPrimary,
}

#[derive(Debug, Deserialize)]
struct AlacrittyPrimary {
    background: String,
    foreground: String,
}

impl Theme {
    pub fn from_alacritty_toml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = toml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty TOML: {}", e))?;
        Ok(Self::from_alacritty(alacritty))
    }

    pub fn from_alacritty_yaml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = serde_yaml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty YAML: {}", e))?;
        Ok(Self::from_alacritty(alacritty))
    }

    fn from_alacritty(alacritty: AlacrittyTheme) -> Self {
        Self {
            background_color: alacritty.colors.primary.background,
            text_color: alacritty.colors.primary.foreground,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;

    #[test]
    fn parses_alacritty_toml_primary_colors() {
        let theme = Theme::from_alacritty_toml(
            r##"
[colors.primary]
background = "#282a36"
foreground = "#f8f8f2"
"##,
        )
        .expect("toml theme");
        assert_eq!(theme.background_color, "#282a36");
        assert_eq!(theme.text_color, "#f8f8f2");
    }

    #[test]
    fn parses_alacritty_yaml_primary_colors() {
        let theme = Theme::from_alacritty_yaml(
            r##"
colors:
  primary:
    background: "#fdf6e3"
    foreground: "#657b83"
"##,
        )
        .expect("yaml theme");
        assert_eq!(theme.background_color, "#fdf6e3");
        assert_eq!(theme.text_color, "#657b83");
    }

    #[test]
    fn rejects_non_theme_input() {
        assert!(Theme::from_alacritty_toml("colors = 3").is_err());
    }
}
