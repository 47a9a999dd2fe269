//! A complete reflective surface for the wgpu backend.

use std::sync::Arc;

use glam::Mat4;
use reflector_core::{
    RecursionGuard, ReflectionOutcome, ReflectionView, Reflector, ReflectorOptions, SurfaceId,
    SurfacePose, UpdateError, ViewerCamera,
};

use crate::error::RenderResult;
use crate::geometry::PlaneGeometry;
use crate::host::WgpuHost;
use crate::material::ReflectorMaterial;
use crate::target::ReflectionTarget;

/// A rectangular mirror: reflector state, plane geometry and material.
///
/// Call [`Mirror::update`] before drawing the scene each frame, then draw the
/// mirror with [`Mirror::draw`] wherever it is visible.
pub struct Mirror {
    id: SurfaceId,
    reflector: Reflector<Arc<ReflectionTarget>>,
    geometry: PlaneGeometry,
    material: ReflectorMaterial,
    bind_group: Option<wgpu::BindGroup>,
}

impl Mirror {
    /// Creates a `width x height` mirror drawn into the host's output format.
    pub fn new(
        host: &WgpuHost,
        id: SurfaceId,
        width: f32,
        height: f32,
        options: ReflectorOptions,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> RenderResult<Self> {
        let reflector = Reflector::new(options)?;
        let geometry = PlaneGeometry::new(host.device(), width, height);
        let material = ReflectorMaterial::new(
            host.device(),
            host.output_format(),
            depth_format,
            reflector.options(),
        );
        log::debug!("created {width}x{height} mirror {id:?}");

        Ok(Self {
            id,
            reflector,
            geometry,
            material,
            bind_group: None,
        })
    }

    /// Surface id used to hide this mirror from its own reflection.
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// The reflector state.
    pub fn reflector(&self) -> &Reflector<Arc<ReflectionTarget>> {
        &self.reflector
    }

    /// The plane geometry.
    pub fn geometry(&self) -> &PlaneGeometry {
        &self.geometry
    }

    /// The surface material.
    pub fn material(&self) -> &ReflectorMaterial {
        &self.material
    }

    /// Renders this frame's reflection. See [`Reflector::update_reflection`].
    pub fn update<F, E>(
        &mut self,
        host: &mut WgpuHost,
        world_matrix: Mat4,
        viewer: &ViewerCamera,
        guard: RecursionGuard,
        render_scene: F,
    ) -> Result<ReflectionOutcome, UpdateError<E>>
    where
        F: FnMut(&mut WgpuHost, ReflectionView<'_, Arc<ReflectionTarget>>) -> Result<(), E>,
    {
        let pose = SurfacePose::new(self.id, world_matrix);
        let outcome = self
            .reflector
            .update_reflection(host, &pose, viewer, guard, render_scene)?;

        if self.bind_group.is_none() {
            if let Some(target) = self.reflector.render_target() {
                self.bind_group = Some(self.material.create_bind_group(host.device(), target));
            }
        }
        Ok(outcome)
    }

    /// Draws the mirror. `view_proj` is the OpenGL-convention
    /// view-projection of the camera drawing it.
    ///
    /// Returns `false` without drawing until a reflection has been rendered.
    pub fn draw(
        &self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        world_matrix: Mat4,
        view_proj: Mat4,
    ) -> bool {
        let Some(bind_group) = &self.bind_group else {
            return false;
        };
        self.material
            .update_uniforms(queue, self.reflector.texture_matrix(), world_matrix, view_proj);
        self.material.draw(pass, bind_group, &self.geometry);
        true
    }
}
