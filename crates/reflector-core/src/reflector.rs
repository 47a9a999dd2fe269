//! Per-surface reflection state and the per-frame update.

use glam::{Mat4, Quat, Vec3};

use crate::camera::{VirtualCamera, ViewerCamera, Viewport};
use crate::color::ClearColor;
use crate::error::{ReflectorError, Result, UpdateError};
use crate::host::{HostStateGuard, RenderHost, RenderTargetDesc, SurfaceId};
use crate::options::ReflectorOptions;
use crate::recursion::RecursionGuard;
use crate::reflection::{mirror_camera, oblique_clip_projection, texture_matrix, MirrorFrame};

/// World pose of a reflective surface for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePose {
    /// Which surface this is, used to hide it from its own reflection.
    pub id: SurfaceId,
    /// Local-to-world matrix. The surface's plane is its local XY plane.
    pub world_matrix: Mat4,
}

impl SurfacePose {
    /// Creates a surface pose.
    #[must_use]
    pub fn new(id: SurfaceId, world_matrix: Mat4) -> Self {
        Self { id, world_matrix }
    }

    /// Creates a surface pose from translation, rotation and scale.
    #[must_use]
    pub fn from_parts(id: SurfaceId, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self::new(
            id,
            Mat4::from_scale_rotation_translation(scale, rotation, translation),
        )
    }

    /// World-space position of the surface origin.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.world_matrix.w_axis.truncate()
    }
}

/// What the scene render callback receives.
pub struct ReflectionView<'a, T> {
    /// The mirrored camera, with its oblique projection.
    pub camera: &'a VirtualCamera,
    /// The offscreen target, already bound on the host.
    pub target: &'a T,
    /// The reflector being rendered; hidden on the host for this render.
    pub surface: SurfaceId,
    /// Guard to pass to reflectors drawn from `camera`.
    pub guard: RecursionGuard,
}

/// Result of a successful [`Reflector::update_reflection`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectionOutcome {
    /// The reflection was rendered into the target.
    Rendered,
    /// The viewer's nesting depth reached the recursion bound; nothing was
    /// done.
    SkippedRecursion,
    /// The culling policy rejected the viewer; the target was left as is.
    Culled,
    /// The culling policy rejected the viewer for the first time since the
    /// last render; the target was cleared to black.
    ClearedStale,
}

/// A planar reflector's persistent state.
///
/// Owns the offscreen target (allocated on the first rendered frame and
/// never resized), the texture matrix used to sample it, and the last
/// derived virtual camera.
#[derive(Debug)]
pub struct Reflector<T> {
    options: ReflectorOptions,
    texture_matrix: Mat4,
    virtual_camera: VirtualCamera,
    render_target: Option<T>,
    rendered_last_frame: bool,
    disabled: bool,
}

impl<T: Clone> Reflector<T> {
    /// Creates a reflector after validating its options.
    pub fn new(options: ReflectorOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            texture_matrix: Mat4::IDENTITY,
            virtual_camera: VirtualCamera::default(),
            render_target: None,
            rendered_last_frame: false,
            disabled: false,
        })
    }

    /// The options this reflector was created with.
    pub fn options(&self) -> &ReflectorOptions {
        &self.options
    }

    /// Matrix mapping the surface's local positions to projective texture
    /// coordinates of the reflection.
    pub fn texture_matrix(&self) -> Mat4 {
        self.texture_matrix
    }

    /// The virtual camera from the last rendered frame.
    pub fn virtual_camera(&self) -> &VirtualCamera {
        &self.virtual_camera
    }

    /// The reflection target, once allocated.
    pub fn render_target(&self) -> Option<&T> {
        self.render_target.as_ref()
    }

    /// Whether an allocation failure disabled this reflector.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Renders this frame's reflection.
    ///
    /// `guard` is the viewer's recursion guard: [`RecursionGuard::root`] for
    /// the application camera, or the guard from an enclosing
    /// [`ReflectionView`] when this reflector is drawn inside another
    /// reflection. `render_scene` draws the scene from the view's camera into
    /// the bound target.
    ///
    /// Host state is restored before this returns, including when
    /// `render_scene` fails; its error is returned unchanged as
    /// [`UpdateError::Scene`].
    pub fn update_reflection<H, F, E>(
        &mut self,
        host: &mut H,
        surface: &SurfacePose,
        viewer: &ViewerCamera,
        guard: RecursionGuard,
        mut render_scene: F,
    ) -> std::result::Result<ReflectionOutcome, UpdateError<E>>
    where
        H: RenderHost<Target = T>,
        F: FnMut(&mut H, ReflectionView<'_, T>) -> std::result::Result<(), E>,
    {
        if self.disabled {
            return Err(ReflectorError::Disabled.into());
        }

        if !guard.allows(self.options.recursion) {
            log::trace!(
                "reflector {:?}: recursion bound {} reached",
                surface.id,
                self.options.recursion
            );
            return Ok(ReflectionOutcome::SkippedRecursion);
        }

        let frame = MirrorFrame::from_world_matrix(&surface.world_matrix);
        let viewer_position = viewer.position();
        let view = frame.position - viewer_position;

        if !self.options.culling.should_render(view, frame.normal) {
            return Ok(self.cull(host, surface.id, viewer.viewport));
        }

        let mut virtual_camera = mirror_camera(
            &frame,
            viewer_position,
            viewer.rotation(),
            viewer.far,
            viewer.projection_matrix,
        );
        let view_matrix = virtual_camera.view_matrix();

        // Sampled with the unclipped projection.
        self.texture_matrix = texture_matrix(
            &virtual_camera.projection_matrix,
            &view_matrix,
            &surface.world_matrix,
        );

        let clip_plane = frame.plane().transformed(&view_matrix).to_vec4();
        virtual_camera.projection_matrix = oblique_clip_projection(
            &virtual_camera.projection_matrix,
            clip_plane,
            self.options.clip_bias,
        );
        self.virtual_camera = virtual_camera;

        let target = self.ensure_render_target(host)?;

        let mut host = HostStateGuard::new(host, surface.id, viewer.viewport);
        host.set_surface_visible(surface.id, false);

        let mut state = host.render_state();
        state.target = Some(target.clone());
        state.clear_color = ClearColor::WHITE;
        state.depth_write = true;
        state.shadow_auto_update = false;
        state.xr_enabled = false;
        host.set_render_state(state);

        if !host.auto_clear() {
            host.clear();
        }

        self.rendered_last_frame = true;
        render_scene(
            &mut *host,
            ReflectionView {
                camera: &self.virtual_camera,
                target: &target,
                surface: surface.id,
                guard: guard.child(),
            },
        )
        .map_err(UpdateError::Scene)?;

        Ok(ReflectionOutcome::Rendered)
    }

    fn ensure_render_target<H>(&mut self, host: &mut H) -> Result<T>
    where
        H: RenderHost<Target = T>,
    {
        if let Some(target) = &self.render_target {
            return Ok(target.clone());
        }

        let desc = RenderTargetDesc {
            width: self.options.texture_width,
            height: self.options.texture_height,
            encoding: host.active_encoding(),
            generate_mipmaps: self.options.generate_mipmaps(),
        };

        match host.create_render_target(&desc) {
            Ok(target) => {
                log::debug!(
                    "allocated {}x{} reflection target ({:?})",
                    desc.width,
                    desc.height,
                    desc.encoding
                );
                self.render_target = Some(target.clone());
                Ok(target)
            }
            Err(err) => {
                log::warn!("reflection target allocation failed, disabling reflector: {err}");
                self.disabled = true;
                Err(err)
            }
        }
    }

    fn cull<H>(
        &mut self,
        host: &mut H,
        surface: SurfaceId,
        viewport: Option<Viewport>,
    ) -> ReflectionOutcome
    where
        H: RenderHost<Target = T>,
    {
        if !self.rendered_last_frame {
            return ReflectionOutcome::Culled;
        }
        self.rendered_last_frame = false;

        let Some(target) = self.render_target.clone() else {
            return ReflectionOutcome::Culled;
        };

        log::trace!("reflector {surface:?} culled, clearing stale reflection");
        let mut host = HostStateGuard::new(host, surface, viewport);
        let mut state = host.render_state();
        state.target = Some(target);
        state.clear_color = ClearColor::BLACK;
        state.depth_write = true;
        host.set_render_state(state);
        host.clear();

        ReflectionOutcome::ClearedStale
    }
}
