//! The seam between a reflector and the renderer that draws it.
//!
//! A reflector never talks to a graphics API directly. It reads and toggles
//! the renderer state described by [`RenderState`], allocates its offscreen
//! target through [`RenderHost::create_render_target`], and relies on
//! [`HostStateGuard`] to put everything back afterwards.

use std::ops::{Deref, DerefMut};

use crate::camera::Viewport;
use crate::color::{ClearColor, ColorEncoding};
use crate::error::Result;

/// Identifies a reflective surface within the host's scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Description of an offscreen reflection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTargetDesc {
    pub width: u32,
    pub height: u32,
    /// Encoding of the colour attachment, matched to the active output.
    pub encoding: ColorEncoding,
    /// Whether a mip chain should be allocated.
    pub generate_mipmaps: bool,
}

/// Renderer state a reflector changes while rendering its reflection.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState<T> {
    /// Bound render target, `None` for the host's default output.
    pub target: Option<T>,
    /// Colour used when clearing.
    pub clear_color: ClearColor,
    /// Whether depth writes are enabled.
    pub depth_write: bool,
    /// Whether shadow maps are re-rendered automatically every frame.
    pub shadow_auto_update: bool,
    /// Whether the XR camera override is active.
    pub xr_enabled: bool,
}

/// A renderer that can host reflectors.
pub trait RenderHost {
    /// Handle to an offscreen render target. Cloning must be cheap.
    type Target: Clone;

    /// Current renderer state.
    fn render_state(&self) -> RenderState<Self::Target>;

    /// Replaces the renderer state.
    fn set_render_state(&mut self, state: RenderState<Self::Target>);

    /// Encoding of the default output.
    fn output_encoding(&self) -> ColorEncoding;

    /// Encoding of an offscreen target.
    fn target_encoding(&self, target: &Self::Target) -> ColorEncoding;

    /// Allocates an offscreen target.
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<Self::Target>;

    /// Whether the host clears the bound target before each scene render.
    fn auto_clear(&self) -> bool;

    /// Clears the bound target with the current clear colour.
    fn clear(&mut self);

    /// Sets the viewport for subsequent rendering.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Whether a surface is drawn by scene renders.
    fn is_surface_visible(&self, surface: SurfaceId) -> bool;

    /// Shows or hides a surface for scene renders.
    fn set_surface_visible(&mut self, surface: SurfaceId, visible: bool);

    /// Encoding of whatever is bound right now.
    fn active_encoding(&self) -> ColorEncoding {
        match self.render_state().target {
            Some(target) => self.target_encoding(&target),
            None => self.output_encoding(),
        }
    }
}

/// Snapshot of host state that is restored when the guard is dropped.
///
/// Restoration happens on every exit path: normal return, early `?` return
/// and unwinding. The guard dereferences to the host so rendering goes
/// through it while it is alive.
pub struct HostStateGuard<'a, H: RenderHost> {
    host: &'a mut H,
    saved: Option<RenderState<H::Target>>,
    surface: SurfaceId,
    surface_visible: bool,
    viewport: Option<Viewport>,
}

impl<'a, H: RenderHost> HostStateGuard<'a, H> {
    /// Captures the host state, the visibility of `surface`, and the viewport
    /// to restore (if any).
    pub fn new(host: &'a mut H, surface: SurfaceId, viewport: Option<Viewport>) -> Self {
        let saved = Some(host.render_state());
        let surface_visible = host.is_surface_visible(surface);
        Self {
            host,
            saved,
            surface,
            surface_visible,
            viewport,
        }
    }

    /// The state captured at construction.
    pub fn saved_state(&self) -> Option<&RenderState<H::Target>> {
        self.saved.as_ref()
    }
}

impl<H: RenderHost> Deref for HostStateGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: RenderHost> DerefMut for HostStateGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: RenderHost> Drop for HostStateGuard<'_, H> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.host.set_render_state(saved);
        }
        if let Some(viewport) = self.viewport {
            self.host.set_viewport(viewport);
        }
        self.host
            .set_surface_visible(self.surface, self.surface_visible);
    }
}
