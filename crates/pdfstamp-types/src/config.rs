//! Export configuration
//!
//! A plain value object: per-kind default colors, the default freetext type
//! size, and an optional progress callback. Constructed once by the caller
//! and never mutated by the engine.

use std::fmt;
use std::sync::Arc;

/// Invoked once per finished page group with `(completed, total)`, both
/// 1-indexed and monotonically increasing.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Defaults applied wherever a record carries no style override of its own.
#[derive(Clone)]
pub struct ExportConfig {
    /// Fill color for text (highlight) annotations.
    pub text_color: String,
    /// Fill color for area annotations and the unknown-kind fallback.
    pub area_color: String,
    /// Freetext font color.
    pub freetext_color: String,
    /// Freetext box background color.
    pub freetext_background: String,
    /// Freetext type size in capture-frame units.
    pub freetext_font_size: f64,
    pub on_progress: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            text_color: "rgba(255, 255, 0, 0.4)".to_string(),
            area_color: "rgba(255, 200, 0, 0.35)".to_string(),
            freetext_color: "#000000".to_string(),
            freetext_background: "#ffffff".to_string(),
            freetext_font_size: 14.0,
            on_progress: None,
        }
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = color.into();
        self
    }

    pub fn with_area_color(mut self, color: impl Into<String>) -> Self {
        self.area_color = color.into();
        self
    }

    pub fn with_freetext_defaults(
        mut self,
        color: impl Into<String>,
        background: impl Into<String>,
        font_size: f64,
    ) -> Self {
        self.freetext_color = color.into();
        self.freetext_background = background.into();
        self.freetext_font_size = font_size;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("text_color", &self.text_color)
            .field("area_color", &self.area_color)
            .field("freetext_color", &self.freetext_color)
            .field("freetext_background", &self.freetext_background)
            .field("freetext_font_size", &self.freetext_font_size)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "Fn"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.freetext_font_size, 14.0);
        assert_eq!(config.freetext_color, "#000000");
        assert!(config.on_progress.is_none());
    }

    #[test]
    fn test_builders() {
        let config = ExportConfig::new()
            .with_text_color("#00ff00")
            .with_freetext_defaults("#111111", "#eeeeee", 10.0);
        assert_eq!(config.text_color, "#00ff00");
        assert_eq!(config.freetext_background, "#eeeeee");
        assert_eq!(config.freetext_font_size, 10.0);
    }

    #[test]
    fn test_progress_callback_is_invocable() {
        let hits = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = hits.clone();
        let config = ExportConfig::new().with_progress(Arc::new(move |done, total| {
            sink.lock().unwrap().push((done, total));
        }));
        if let Some(cb) = &config.on_progress {
            cb(1, 3);
            cb(2, 3);
        }
        assert_eq!(*hits.lock().unwrap(), vec![(1, 3), (2, 3)]);
    }
}
