//! wgpu backend for reflector-rs.
//!
//! This crate hosts reflectors on a wgpu device:
//! - [`ReflectionTarget`]: offscreen colour and depth attachments
//! - [`WgpuHost`]: the [`reflector_core::RenderHost`] implementation
//! - [`ReflectorMaterial`] and [`PlaneGeometry`]: drawing the reflective surface
//! - [`Mirror`]: all of the above for one rectangular mirror

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// GPU sizes are small and bounded by device limits
#![allow(clippy::cast_possible_truncation)]

pub mod clip;
pub mod error;
pub mod geometry;
pub mod host;
pub mod material;
pub mod mipmap;
pub mod mirror;
pub mod target;

pub use clip::{to_wgpu_projection, virtual_view_projection, GL_TO_WGPU_CLIP};
pub use error::{RenderError, RenderResult};
pub use geometry::{plane_mesh, PlaneGeometry, SurfaceVertex};
pub use host::WgpuHost;
pub use material::{ReflectorMaterial, ReflectorUniforms};
pub use mipmap::MipmapGenerator;
pub use mirror::Mirror;
pub use target::{color_format, format_encoding, full_mip_count, ReflectionTarget, DEPTH_FORMAT};

/// Requests a device with default limits from the first available adapter.
pub async fn request_device() -> RenderResult<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .map_err(|_| RenderError::AdapterCreationFailed)?;
    log::debug!("using adapter {:?}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("reflector device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        })
        .await?;

    Ok((device, queue))
}
