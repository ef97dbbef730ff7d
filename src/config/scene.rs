use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::animation::engine::AnimationVariant;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{FramepopError, FramepopResult};
use crate::foundation::tunables::DEFAULT_SUBJECT_PADDING;
use crate::shape::path::ShapeKind;

/// Read-only configuration snapshot consumed once per frame.
///
/// This is the JSON-facing representation; every field has a default so partial documents are
/// accepted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Clip shape drawn around the subject.
    pub shape_kind: ShapeKind,
    /// Clear color as packed `0xAARRGGBB`.
    pub background_color: u32,
    /// Draw the parallax depth-pop layer on top of the clipped image.
    pub depth_pop_enabled: bool,
    /// Padding factor applied to the subject bounds.
    pub subject_padding_scale: f64,
    /// Move the subject toward the screen center during the transition.
    pub centering_enabled: bool,
    /// Transition dynamics.
    pub animation_variant: AnimationVariant,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            shape_kind: ShapeKind::Circle,
            background_color: 0xFF00_0000,
            depth_pop_enabled: true,
            subject_padding_scale: DEFAULT_SUBJECT_PADDING,
            centering_enabled: true,
            animation_variant: AnimationVariant::Eased,
        }
    }
}

impl SceneConfig {
    /// Parse a config snapshot from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FramepopResult<Self> {
        let cfg: SceneConfig = serde_json::from_reader(r)
            .map_err(|e| FramepopError::validation(format!("parse scene config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config snapshot from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FramepopResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FramepopError::validation(format!("open scene config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> FramepopResult<()> {
        if !self.subject_padding_scale.is_finite() || self.subject_padding_scale <= 0.0 {
            return Err(FramepopError::validation(format!(
                "subject_padding_scale must be finite and > 0, got {}",
                self.subject_padding_scale
            )));
        }
        Ok(())
    }

    pub fn background(&self) -> Rgba8Premul {
        Rgba8Premul::from_argb32(self.background_color)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/scene.rs"]
mod tests;
