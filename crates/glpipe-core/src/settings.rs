//! Run configuration for the harness.

use std::env;
use std::str::FromStr;

use tracing::warn;

use crate::surface::Key;
use crate::types::ClearColor;

/// Window and frame settings.
///
/// Defaults reproduce the original harness: a 640x480 window titled
/// "learning graphics", vsync on, Escape to quit.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: ClearColor,
    pub vsync: bool,
    pub exit_key: Key,
    /// Requested OpenGL core profile version.
    pub gl_version: (u8, u8),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "learning graphics".to_string(),
            width: 640,
            height: 480,
            clear_color: ClearColor::rgb(0.2, 0.3, 0.3),
            vsync: true,
            exit_key: Key::Escape,
            gl_version: (3, 3),
        }
    }
}

impl Settings {
    /// Defaults overridden by `GLPIPE_TITLE`, `GLPIPE_WIDTH`, `GLPIPE_HEIGHT`,
    /// `GLPIPE_VSYNC` and `GLPIPE_EXIT_KEY`. Values that fail to parse are
    /// logged and skipped.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from any key/value lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(title) = lookup("GLPIPE_TITLE") {
            self.title = title;
        }
        if let Some(width) = parse_var(&lookup, "GLPIPE_WIDTH") {
            self.width = width;
        }
        if let Some(height) = parse_var(&lookup, "GLPIPE_HEIGHT") {
            self.height = height;
        }
        if let Some(vsync) = parse_var(&lookup, "GLPIPE_VSYNC") {
            self.vsync = vsync;
        }
        if let Some(key) = parse_var(&lookup, "GLPIPE_EXIT_KEY") {
            self.exit_key = key;
        }
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_clear_color(mut self, color: ClearColor) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_exit_key(mut self, key: Key) -> Self {
        self.exit_key = key;
        self
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("ignoring {name}={raw:?}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_original_window() {
        let settings = Settings::default();
        assert_eq!(settings.title, "learning graphics");
        assert_eq!((settings.width, settings.height), (640, 480));
        assert!(settings.vsync);
        assert_eq!(settings.exit_key, Key::Escape);
    }

    #[test]
    fn overrides_apply_and_bad_values_are_skipped() {
        let settings = Settings::default().with_overrides(lookup(&[
            ("GLPIPE_TITLE", "triangle"),
            ("GLPIPE_WIDTH", "1024"),
            ("GLPIPE_HEIGHT", "tall"),
            ("GLPIPE_VSYNC", "false"),
            ("GLPIPE_EXIT_KEY", "q"),
        ]));

        assert_eq!(settings.title, "triangle");
        assert_eq!(settings.width, 1024);
        assert_eq!(settings.height, 480);
        assert!(!settings.vsync);
        assert_eq!(settings.exit_key, Key::Q);
    }
}
