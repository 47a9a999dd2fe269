//! Colour helpers shared by the reflector and its material.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Colour encoding of a render target's colour attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorEncoding {
    /// Values are stored linearly.
    #[default]
    Linear,
    /// Values are stored sRGB-encoded.
    Srgb,
}

/// Clear colour and alpha of a render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor {
    pub color: Vec3,
    pub alpha: f32,
}

impl ClearColor {
    /// Opaque white, used before rendering a reflection.
    pub const WHITE: Self = Self {
        color: Vec3::ONE,
        alpha: 1.0,
    };

    /// Opaque black, written into a reflection that stopped being rendered.
    pub const BLACK: Self = Self {
        color: Vec3::ZERO,
        alpha: 1.0,
    };

    /// Creates a clear colour.
    #[must_use]
    pub fn new(color: Vec3, alpha: f32) -> Self {
        Self { color, alpha }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0)
    }
}

/// Converts a `0xRRGGBB` value to a colour with components in [0, 1].
#[must_use]
pub fn color_from_hex(hex: u32) -> Vec3 {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    Vec3::new(channel(16), channel(8), channel(0))
}

/// Overlay blend of a single channel.
#[must_use]
pub fn blend_overlay_channel(base: f32, tint: f32) -> f32 {
    if base < 0.5 {
        2.0 * base * tint
    } else {
        1.0 - 2.0 * (1.0 - base) * (1.0 - tint)
    }
}

/// Overlay blend applied per channel.
///
/// Mirrors `blend_overlay` in `reflector.wgsl`.
#[must_use]
pub fn blend_overlay(base: Vec3, tint: Vec3) -> Vec3 {
    Vec3::new(
        blend_overlay_channel(base.x, tint.x),
        blend_overlay_channel(base.y, tint.y),
        blend_overlay_channel(base.z, tint.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_color_from_hex() {
        let gray = color_from_hex(0x7f7f7f);
        assert!((gray.x - 127.0 / 255.0).abs() < 1e-6);
        assert_eq!(gray.x, gray.y);
        assert_eq!(gray.y, gray.z);

        let teal = color_from_hex(0x889999);
        assert!((teal.x - 136.0 / 255.0).abs() < 1e-6);
        assert!((teal.y - 153.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_blend_overlay_branches() {
        assert!((blend_overlay_channel(0.25, 0.5) - 0.25).abs() < 1e-6);
        assert!((blend_overlay_channel(0.75, 0.5) - 0.75).abs() < 1e-6);
        assert_eq!(blend_overlay_channel(0.0, 0.9), 0.0);
        assert_eq!(blend_overlay_channel(1.0, 0.1), 1.0);
    }

    #[test]
    fn test_blend_overlay_per_channel() {
        let out = blend_overlay(Vec3::new(0.2, 0.5, 0.9), Vec3::splat(0.5));
        assert!((out - Vec3::new(0.2, 0.5, 0.9)).length() < 1e-6);
    }

    proptest! {
        #[test]
        fn blend_overlay_stays_in_unit_range(base in 0.0f32..=1.0, tint in 0.0f32..=1.0) {
            let out = blend_overlay_channel(base, tint);
            prop_assert!((0.0..=1.0).contains(&out));
        }

        #[test]
        fn mid_gray_tint_is_identity(base in 0.0f32..=1.0) {
            prop_assert!((blend_overlay_channel(base, 0.5) - base).abs() < 1e-6);
        }
    }
}
