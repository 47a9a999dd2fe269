//! Core abstractions for reflector-rs.
//!
//! This crate provides the backend-independent half of a planar reflector:
//! - [`Reflector`], the per-surface state and its per-frame update
//! - Reflection math: mirrored cameras, texture matrix, oblique near plane
//! - The [`RenderHost`] trait a renderer implements to host reflectors
//! - Configuration options and error types

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Matrix math reads better with single-letter names
#![allow(clippy::many_single_char_names)]

pub mod camera;
pub mod color;
pub mod error;
pub mod host;
pub mod options;
pub mod plane;
pub mod recursion;
pub mod reflection;
pub mod reflector;

pub use camera::{Camera, ViewerCamera, Viewport, VirtualCamera};
pub use color::{blend_overlay, color_from_hex, ClearColor, ColorEncoding};
pub use error::{ReflectorError, Result, UpdateError};
pub use host::{HostStateGuard, RenderHost, RenderState, RenderTargetDesc, SurfaceId};
pub use options::{CullingPolicy, ReflectorOptions};
pub use plane::Plane;
pub use recursion::RecursionGuard;
pub use reflection::{
    mirror_camera, mirror_point, oblique_clip_projection, reflect, texture_matrix,
    MirrorFrame, TEXTURE_BIAS,
};
pub use reflector::{ReflectionOutcome, ReflectionView, Reflector, SurfacePose};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
