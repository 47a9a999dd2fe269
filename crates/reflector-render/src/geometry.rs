//! Geometry for reflective surfaces.

use wgpu::util::DeviceExt;

/// Vertex of a reflective surface. Only the local position is needed: the
/// material derives texture coordinates from the texture matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
}

impl SurfaceVertex {
    /// Vertex buffer layout matching `reflector.wgsl`.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SurfaceVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Builds the vertices and counter-clockwise indices of a `width x height`
/// plane in local XY, centred on the origin and facing +Z.
#[must_use]
pub fn plane_mesh(width: f32, height: f32) -> (Vec<SurfaceVertex>, Vec<u16>) {
    let hw = width * 0.5;
    let hh = height * 0.5;
    let vertices = vec![
        SurfaceVertex {
            position: [-hw, -hh, 0.0],
        },
        SurfaceVertex {
            position: [hw, -hh, 0.0],
        },
        SurfaceVertex {
            position: [hw, hh, 0.0],
        },
        SurfaceVertex {
            position: [-hw, hh, 0.0],
        },
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    (vertices, indices)
}

/// GPU buffers for a rectangular reflective surface.
pub struct PlaneGeometry {
    width: f32,
    height: f32,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl PlaneGeometry {
    /// Uploads a `width x height` plane.
    pub fn new(device: &wgpu::Device, width: f32, height: f32) -> Self {
        let (vertices, indices) = plane_mesh(width, height);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Reflector Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Reflector Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            width,
            height,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Plane width in local units.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Plane height in local units.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Binds the buffers and issues the draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_plane_mesh_extent() {
        let (vertices, indices) = plane_mesh(3.0, 2.0);
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
        for vertex in &vertices {
            let [x, y, z] = vertex.position;
            assert_eq!(x.abs(), 1.5);
            assert_eq!(y.abs(), 1.0);
            assert_eq!(z, 0.0);
        }
    }

    #[test]
    fn test_plane_mesh_faces_positive_z() {
        let (vertices, indices) = plane_mesh(1.0, 1.0);
        for triangle in indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from(vertices[triangle[i] as usize].position));
            let normal = (b - a).cross(c - a).normalize();
            assert!((normal - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_vertex_layout() {
        let layout = SurfaceVertex::layout();
        assert_eq!(layout.array_stride, 12);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(std::mem::size_of::<SurfaceVertex>(), 12);
    }
}
