use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::command::ResponseKind;
use crate::error::{MakeupError, Result};
use crate::input::Session;
use crate::palette::{self, Rgb};
use crate::window::Window;

pub const SETTINGS_FILENAME: &str = "makeup.json";

/// Application settings, stored as JSON.
///
/// Missing fields take their defaults, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dev_mode: bool,
    pub windowed: Window,
    pub fullscreen: bool,
    pub theme: Theme,
}

/// Palette color names for the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub text: String,
    pub background: String,
    pub ok: String,
    pub error: String,
}

/// A [`Theme`] with every name resolved against the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub text: Rgb,
    pub background: Rgb,
    pub ok: Rgb,
    pub error: Rgb,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dev_mode: false,
            windowed: Window::WINDOWED_DEFAULT,
            fullscreen: false,
            theme: Theme::default(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: "lightgravel".to_string(),
            background: "blackgravel".to_string(),
            ok: "saltwatertaffy".to_string(),
            error: "taffy".to_string(),
        }
    }
}

impl Theme {
    pub fn resolve(&self) -> Result<ThemeColors> {
        Ok(ThemeColors {
            text: palette::resolve(&self.text)?.rgb,
            background: palette::resolve(&self.background)?.rgb,
            ok: palette::resolve(&self.ok)?.rgb,
            error: palette::resolve(&self.error)?.rgb,
        })
    }

    /// Foreground color for an output line of the given kind.
    pub fn color_for(&self, kind: ResponseKind) -> Result<Rgb> {
        let name = match kind {
            ResponseKind::Plain => &self.text,
            ResponseKind::Ok => &self.ok,
            ResponseKind::Error => &self.error,
        };
        Ok(palette::resolve(name)?.rgb)
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|error| MakeupError::Config {
            path: path.to_path_buf(),
            message: format!("failed to read settings: {error}"),
        })?;
        let settings: Settings =
            serde_json::from_str(&data).map_err(|error| MakeupError::Config {
                path: path.to_path_buf(),
                message: format!("failed to parse settings: {error}"),
            })?;
        settings
            .theme
            .resolve()
            .map_err(|error| MakeupError::Config {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;
        Ok(settings)
    }

    /// Loads `path`, or returns defaults if it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).map_err(|error| MakeupError::Config {
            path: path.to_path_buf(),
            message: format!("failed to serialize settings: {error}"),
        })?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Session flags the application starts with.
    pub fn session(&self) -> Session {
        let mut session = Session::new();
        session.set_dev_mode(self.dev_mode);
        session
    }

    /// Window size to open with, or `None` for fullscreen.
    pub fn window(&self) -> Option<Window> {
        (!self.fullscreen).then_some(self.windowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!(!settings.dev_mode);
        assert_eq!(settings.window(), Some(Window::new(640, 480)));
        let colors = settings.theme.resolve().expect("resolve");
        assert_eq!(colors.error.to_hex(), "#ff2c4b");
        assert_eq!(colors.background.to_hex(), "#1c1b1a");
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILENAME);
        let mut settings = Settings::default();
        settings.dev_mode = true;
        settings.fullscreen = true;
        settings.theme.text = "plain".to_string();
        settings.save(&path).expect("save");

        let loaded = Settings::load(&path).expect("load");
        assert_eq!(loaded, settings);
        assert!(loaded.session().dev_mode());
        assert_eq!(loaded.window(), None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, r#"{"windowed": {"cols": 1200, "rows": 600}, "theme": {"ok": "lime"}}"#)
            .expect("write");

        let loaded = Settings::load(&path).expect("load");
        assert_eq!(loaded.windowed.size(), (1200, 600));
        assert_eq!(loaded.theme.ok, "lime");
        assert_eq!(loaded.theme.error, "taffy");
        assert!(!loaded.dev_mode);
    }

    #[test]
    fn unknown_theme_color_is_a_config_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, r#"{"theme": {"text": "mauve"}}"#).expect("write");

        let err = Settings::load(&path).expect_err("expected error");
        match err {
            MakeupError::Config { message, .. } => assert!(message.contains("mauve")),
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, "{not json").expect("write");

        assert!(Settings::load(&path).is_err());
        assert_eq!(Settings::load_or_default(&path), Settings::default());
        assert_eq!(
            Settings::load_or_default(&dir.path().join("missing.json")),
            Settings::default()
        );
    }

    #[test]
    fn colors_follow_response_kind() {
        let theme = Theme::default();
        assert_eq!(theme.color_for(ResponseKind::Ok).expect("ok").to_hex(), "#8cffba");
        assert_eq!(theme.color_for(ResponseKind::Plain).expect("plain").to_hex(), "#998f84");
        let broken = Theme {
            error: "nope".to_string(),
            ..Theme::default()
        };
        assert!(matches!(
            broken.color_for(ResponseKind::Error),
            Err(MakeupError::UnknownColor(_))
        ));
    }
}
