//! The material that draws a reflector's surface.

use glam::{Mat4, Vec3};
use reflector_core::ReflectorOptions;
use wgpu::util::DeviceExt;

use crate::clip::GL_TO_WGPU_CLIP;
use crate::geometry::{PlaneGeometry, SurfaceVertex};
use crate::target::ReflectionTarget;

/// GPU representation of reflector uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ReflectorUniforms {
    pub texture_matrix: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// wgpu-convention view-projection of the camera drawing the surface.
    pub view_proj: [[f32; 4]; 4],
    /// Tint in rgb, output alpha in a.
    pub color: [f32; 4],
}

impl Default for ReflectorUniforms {
    fn default() -> Self {
        Self {
            texture_matrix: Mat4::IDENTITY.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            color: [0.5, 0.5, 0.5, 1.0],
        }
    }
}

impl ReflectorUniforms {
    /// Packs uniforms. `view_proj` uses OpenGL clip depth and is remapped.
    #[must_use]
    pub fn new(texture_matrix: Mat4, model: Mat4, view_proj: Mat4, tint: Vec3) -> Self {
        Self {
            texture_matrix: texture_matrix.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            view_proj: (GL_TO_WGPU_CLIP * view_proj).to_cols_array_2d(),
            color: tint.extend(1.0).to_array(),
        }
    }
}

/// Pipeline and uniforms that project the reflection onto the surface and
/// overlay-blend it with the tint colour.
pub struct ReflectorMaterial {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    tint: Vec3,
    transparent: bool,
}

impl ReflectorMaterial {
    /// Creates the material for drawing into `color_format` targets, with an
    /// optional depth attachment.
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        options: &ReflectorOptions,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Reflector Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Reflection texture
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Reflection sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Reflector Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/reflector.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Reflector Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let blend = if options.transparent {
            Some(wgpu::BlendState::ALPHA_BLENDING)
        } else {
            None
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Reflector Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SurfaceVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Reflector Uniform Buffer"),
            contents: bytemuck::cast_slice(&[ReflectorUniforms {
                color: options.color.extend(1.0).to_array(),
                ..Default::default()
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            tint: options.color,
            transparent: options.transparent,
        }
    }

    /// Tint colour blended over the reflection.
    pub fn tint(&self) -> Vec3 {
        self.tint
    }

    /// Whether the surface is drawn with alpha blending. Output alpha is
    /// always 1.0.
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Returns the bind group layout.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Updates the uniforms for the next draw.
    ///
    /// `view_proj` is the OpenGL-convention view-projection of the camera
    /// drawing the surface. The write lands at the next queue submission, so
    /// work using the previous values must be submitted first.
    pub fn update_uniforms(
        &self,
        queue: &wgpu::Queue,
        texture_matrix: Mat4,
        model: Mat4,
        view_proj: Mat4,
    ) {
        let uniforms = ReflectorUniforms::new(texture_matrix, model, view_proj, self.tint);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Creates a bind group sampling `target`.
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        target: &ReflectionTarget,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Reflector Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(target.sample_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(target.sampler()),
                },
            ],
        })
    }

    /// Draws `geometry` with this material.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        bind_group: &wgpu::BindGroup,
        geometry: &PlaneGeometry,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        geometry.draw(pass);
    }
}
