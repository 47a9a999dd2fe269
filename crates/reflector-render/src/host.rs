//! A [`RenderHost`] backed by a wgpu device.

use std::collections::HashSet;
use std::sync::Arc;

use reflector_core::{
    ClearColor, ColorEncoding, RenderHost, RenderState, RenderTargetDesc, SurfaceId, Viewport,
};

use crate::mipmap::MipmapGenerator;
use crate::target::{format_encoding, ReflectionTarget};

fn wgpu_color(clear: ClearColor) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(clear.color.x),
        g: f64::from(clear.color.y),
        b: f64::from(clear.color.z),
        a: f64::from(clear.alpha),
    }
}

/// Render host state over a wgpu device and queue.
///
/// The host tracks what a reflector toggles (bound target, clear colour,
/// depth writes, shadow and XR flags, viewport, hidden surfaces). Scene
/// renderers read it back through [`WgpuHost::begin_scene_pass`] and
/// [`WgpuHost::is_surface_visible`].
///
/// Mip levels of a reflection target are regenerated when the target is
/// unbound.
pub struct WgpuHost {
    device: wgpu::Device,
    queue: wgpu::Queue,
    output_format: wgpu::TextureFormat,
    output_view: Option<wgpu::TextureView>,
    output_depth_view: Option<wgpu::TextureView>,
    state: RenderState<Arc<ReflectionTarget>>,
    viewport: Option<Viewport>,
    hidden: HashSet<SurfaceId>,
    auto_clear: bool,
    mipmaps: MipmapGenerator,
}

impl WgpuHost {
    /// Creates a host whose default output has `output_format`.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, output_format: wgpu::TextureFormat) -> Self {
        let mipmaps = MipmapGenerator::new(&device);
        Self {
            device,
            queue,
            output_format,
            output_view: None,
            output_depth_view: None,
            state: RenderState {
                target: None,
                clear_color: ClearColor::BLACK,
                depth_write: true,
                shadow_auto_update: true,
                xr_enabled: false,
            },
            viewport: None,
            hidden: HashSet::new(),
            auto_clear: true,
            mipmaps,
        }
    }

    /// Sets whether scene passes clear their target.
    #[must_use]
    pub fn with_auto_clear(mut self, auto_clear: bool) -> Self {
        self.auto_clear = auto_clear;
        self
    }

    /// The wgpu device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// The wgpu queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Format of the default output.
    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.output_format
    }

    /// Sets the views the default output renders into this frame.
    pub fn set_output(&mut self, color: wgpu::TextureView, depth: Option<wgpu::TextureView>) {
        self.output_view = Some(color);
        self.output_depth_view = depth;
    }

    /// The bound reflection target, if any.
    pub fn bound_target(&self) -> Option<&Arc<ReflectionTarget>> {
        self.state.target.as_ref()
    }

    /// Current clear colour.
    pub fn clear_color(&self) -> ClearColor {
        self.state.clear_color
    }

    /// Whether scene draws should write depth.
    pub fn depth_write(&self) -> bool {
        self.state.depth_write
    }

    /// Whether shadow maps should be refreshed this frame.
    pub fn shadow_auto_update(&self) -> bool {
        self.state.shadow_auto_update
    }

    /// Whether the XR camera override is active.
    pub fn xr_enabled(&self) -> bool {
        self.state.xr_enabled
    }

    /// Enables or disables the XR camera override.
    pub fn set_xr_enabled(&mut self, enabled: bool) {
        self.state.xr_enabled = enabled;
    }

    /// The viewport for the default output.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn color_and_depth_views(&self) -> Option<(&wgpu::TextureView, Option<&wgpu::TextureView>)> {
        match &self.state.target {
            Some(target) => Some((target.render_view(), Some(target.depth_view()))),
            None => self
                .output_view
                .as_ref()
                .map(|view| (view, self.output_depth_view.as_ref())),
        }
    }

    fn encode_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        label: &str,
        clear: bool,
    ) -> Option<wgpu::RenderPass<'e>> {
        let (color_view, depth_view) = self.color_and_depth_views()?;

        let load = if clear {
            wgpu::LoadOp::Clear(wgpu_color(self.state.clear_color))
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if clear {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: depth_view.map(|view| {
                wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        // Offscreen targets always use their full extent.
        if self.state.target.is_none() {
            if let Some(viewport) = self.viewport {
                pass.set_viewport(
                    viewport.x,
                    viewport.y,
                    viewport.width,
                    viewport.height,
                    0.0,
                    1.0,
                );
            }
        }
        Some(pass)
    }

    /// Begins a scene render pass on whatever is bound, clearing first when
    /// auto-clear is on.
    ///
    /// Returns `None` when nothing is bound and no output view was set. The
    /// encoder must be submitted before the reflector's scene callback
    /// returns.
    pub fn begin_scene_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
    ) -> Option<wgpu::RenderPass<'e>> {
        self.encode_pass(encoder, "Scene Pass", self.auto_clear)
    }
}

impl RenderHost for WgpuHost {
    type Target = Arc<ReflectionTarget>;

    fn render_state(&self) -> RenderState<Self::Target> {
        self.state.clone()
    }

    fn set_render_state(&mut self, state: RenderState<Self::Target>) {
        if let Some(previous) = &self.state.target {
            let unbound = state
                .target
                .as_ref()
                .map_or(true, |next| !Arc::ptr_eq(previous, next));
            if unbound {
                self.mipmaps
                    .generate(&self.device, &self.queue, previous.color_texture());
            }
        }
        self.state = state;
    }

    fn output_encoding(&self) -> ColorEncoding {
        format_encoding(self.output_format)
    }

    fn target_encoding(&self, target: &Self::Target) -> ColorEncoding {
        target.encoding()
    }

    fn create_render_target(
        &mut self,
        desc: &RenderTargetDesc,
    ) -> reflector_core::Result<Self::Target> {
        ReflectionTarget::new(&self.device, desc)
            .map(Arc::new)
            .map_err(|err| err.into_allocation_error(desc.width, desc.height))
    }

    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    fn clear(&mut self) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("clear encoder"),
            });
        if self.encode_pass(&mut encoder, "Clear Pass", true).is_none() {
            log::trace!("clear skipped: nothing bound");
            return;
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn is_surface_visible(&self, surface: SurfaceId) -> bool {
        !self.hidden.contains(&surface)
    }

    fn set_surface_visible(&mut self, surface: SurfaceId, visible: bool) {
        if visible {
            self.hidden.remove(&surface);
        } else {
            self.hidden.insert(surface);
        }
    }
}
