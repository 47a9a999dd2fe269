//! Per-reflector configuration.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color::color_from_hex;
use crate::error::{ReflectorError, Result};

/// Default tint colour (mid gray, `0x7f7f7f`).
pub const DEFAULT_TINT_HEX: u32 = 0x7f_7f7f;

/// Default reflection texture size in pixels.
pub const DEFAULT_TEXTURE_SIZE: u32 = 512;

/// When a reflector skips rendering its reflection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CullingPolicy {
    /// Always render the reflection.
    #[default]
    Always,
    /// Render only while the viewer is in front of the reflector and closer
    /// than `max_distance`. When the reflector becomes culled its target is
    /// cleared to black once so stale content is never sampled.
    FacingAndDistance { max_distance: f32 },
}

impl CullingPolicy {
    /// Returns whether a viewer at offset `view` (reflector position minus
    /// viewer position) should see a reflection on a surface with `normal`.
    #[must_use]
    pub fn should_render(&self, view: Vec3, normal: Vec3) -> bool {
        match *self {
            CullingPolicy::Always => true,
            CullingPolicy::FacingAndDistance { max_distance } => {
                view.dot(normal) < 0.0 && view.length() < max_distance
            }
        }
    }
}

/// Configuration options for a reflector, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectorOptions {
    /// Tint colour blended over the reflection.
    pub color: Vec3,

    /// Reflection render target width in pixels.
    pub texture_width: u32,

    /// Reflection render target height in pixels.
    pub texture_height: u32,

    /// Offset applied to the oblique clip plane to hide self-intersection
    /// artifacts at the mirror surface.
    pub clip_bias: f32,

    /// Maximum nesting depth of reflections seen inside reflections.
    /// 0 disables nested reflections.
    pub recursion: u32,

    /// Whether the reflector surface is drawn with alpha blending.
    ///
    /// This only selects the blend state. The surface shader writes alpha
    /// 1.0, so a transparent reflector still covers what is behind it.
    pub transparent: bool,

    /// Whether rendering is gated on facing and distance.
    pub culling: CullingPolicy,
}

impl Default for ReflectorOptions {
    fn default() -> Self {
        Self {
            color: color_from_hex(DEFAULT_TINT_HEX),
            texture_width: DEFAULT_TEXTURE_SIZE,
            texture_height: DEFAULT_TEXTURE_SIZE,
            clip_bias: 0.0,
            recursion: 0,
            transparent: false,
            culling: CullingPolicy::Always,
        }
    }
}

impl ReflectorOptions {
    /// Sets the tint colour.
    #[must_use]
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    /// Sets the render target size.
    #[must_use]
    pub fn with_texture_size(mut self, width: u32, height: u32) -> Self {
        self.texture_width = width;
        self.texture_height = height;
        self
    }

    /// Sets the clip bias.
    #[must_use]
    pub fn with_clip_bias(mut self, clip_bias: f32) -> Self {
        self.clip_bias = clip_bias;
        self
    }

    /// Sets the recursion bound.
    #[must_use]
    pub fn with_recursion(mut self, recursion: u32) -> Self {
        self.recursion = recursion;
        self
    }

    /// Sets the transparency flag.
    #[must_use]
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    /// Sets the culling policy.
    #[must_use]
    pub fn with_culling(mut self, culling: CullingPolicy) -> Self {
        self.culling = culling;
        self
    }

    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Serializes options to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that the options describe a usable reflector.
    pub fn validate(&self) -> Result<()> {
        if self.texture_width == 0 || self.texture_height == 0 {
            return Err(ReflectorError::InvalidOptions(format!(
                "texture size must be non-zero, got {}x{}",
                self.texture_width, self.texture_height
            )));
        }
        if !self.clip_bias.is_finite() {
            return Err(ReflectorError::InvalidOptions(
                "clip bias must be finite".into(),
            ));
        }
        if let CullingPolicy::FacingAndDistance { max_distance } = self.culling {
            if max_distance.is_nan() || max_distance <= 0.0 {
                return Err(ReflectorError::InvalidOptions(format!(
                    "max culling distance must be positive, got {max_distance}"
                )));
            }
        }
        Ok(())
    }

    /// Whether mipmaps can be generated for the render target.
    ///
    /// Only power-of-two sizes get mipmaps.
    #[must_use]
    pub fn generate_mipmaps(&self) -> bool {
        self.texture_width.is_power_of_two() && self.texture_height.is_power_of_two()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ReflectorOptions::default();
        assert_eq!(options.texture_width, 512);
        assert_eq!(options.texture_height, 512);
        assert_eq!(options.clip_bias, 0.0);
        assert_eq!(options.recursion, 0);
        assert!(!options.transparent);
        assert_eq!(options.culling, CullingPolicy::Always);
        assert!((options.color.x - 127.0 / 255.0).abs() < 1e-6);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let options = ReflectorOptions::from_json(
            r#"{ "clip_bias": 0.003, "recursion": 1, "transparent": true,
                 "culling": { "mode": "facing_and_distance", "max_distance": 20.0 } }"#,
        )
        .expect("valid options");
        assert_eq!(options.clip_bias, 0.003);
        assert_eq!(options.recursion, 1);
        assert!(options.transparent);
        assert_eq!(
            options.culling,
            CullingPolicy::FacingAndDistance { max_distance: 20.0 }
        );
        assert_eq!(options.texture_width, DEFAULT_TEXTURE_SIZE);
    }

    #[test]
    fn test_json_round_trip() {
        let options = ReflectorOptions::default()
            .with_texture_size(1024, 768)
            .with_color(Vec3::new(0.1, 0.2, 0.3));
        let json = options.to_json().expect("serializable");
        let parsed = ReflectorOptions::from_json(&json).expect("parsable");
        assert_eq!(parsed, options);
    }

    #[test]
    fn test_rejects_zero_size() {
        let result = ReflectorOptions::from_json(r#"{ "texture_width": 0 }"#);
        assert!(matches!(result, Err(ReflectorError::InvalidOptions(_))));
    }

    #[test]
    fn test_rejects_bad_json() {
        let result = ReflectorOptions::from_json("{ not json");
        assert!(matches!(result, Err(ReflectorError::Config(_))));
    }

    #[test]
    fn test_rejects_non_positive_distance() {
        let options = ReflectorOptions::default()
            .with_culling(CullingPolicy::FacingAndDistance { max_distance: 0.0 });
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_generate_mipmaps() {
        assert!(ReflectorOptions::default().generate_mipmaps());
        assert!(!ReflectorOptions::default()
            .with_texture_size(640, 512)
            .generate_mipmaps());
    }

    #[test]
    fn test_culling_policy() {
        let normal = Vec3::Z;
        // Viewer at +Z looking at a mirror at the origin.
        let in_front = Vec3::ZERO - Vec3::new(0.0, 0.0, 5.0);
        let behind = Vec3::ZERO - Vec3::new(0.0, 0.0, -5.0);
        let far_away = Vec3::ZERO - Vec3::new(0.0, 0.0, 50.0);

        assert!(CullingPolicy::Always.should_render(behind, normal));

        let policy = CullingPolicy::FacingAndDistance { max_distance: 20.0 };
        assert!(policy.should_render(in_front, normal));
        assert!(!policy.should_render(behind, normal));
        assert!(!policy.should_render(far_away, normal));
    }
}
