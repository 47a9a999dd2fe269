//! Offscreen render targets for reflections.

use reflector_core::{ColorEncoding, RenderTargetDesc};

use crate::error::{RenderError, RenderResult};

/// Depth format of every reflection target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Colour format used for a reflection target with the given encoding.
#[must_use]
pub fn color_format(encoding: ColorEncoding) -> wgpu::TextureFormat {
    match encoding {
        ColorEncoding::Linear => wgpu::TextureFormat::Rgba8Unorm,
        ColorEncoding::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
    }
}

/// Encoding of a colour format, as seen by a reflector.
#[must_use]
pub fn format_encoding(format: wgpu::TextureFormat) -> ColorEncoding {
    if format.is_srgb() {
        ColorEncoding::Srgb
    } else {
        ColorEncoding::Linear
    }
}

/// Number of mip levels in a full chain for a `width x height` texture.
#[must_use]
pub fn full_mip_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Bytes per row for readback, aligned to `COPY_BYTES_PER_ROW_ALIGNMENT`.
fn aligned_bytes_per_row(width: u32) -> u32 {
    let unaligned = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}

/// Colour and depth attachments a reflection is rendered into.
///
/// Size and encoding are fixed at creation.
pub struct ReflectionTarget {
    color_texture: wgpu::Texture,
    /// First mip level only, for use as a render attachment.
    render_view: wgpu::TextureView,
    /// Every mip level, for sampling.
    sample_view: wgpu::TextureView,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    desc: RenderTargetDesc,
}

impl ReflectionTarget {
    /// Allocates a reflection target.
    ///
    /// Allocation errors reported by the device are caught with error scopes
    /// and returned instead of reaching the device's uncaptured error handler.
    pub fn new(device: &wgpu::Device, desc: &RenderTargetDesc) -> RenderResult<Self> {
        let max = device.limits().max_texture_dimension_2d;
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            return Err(RenderError::TargetTooLarge {
                width: desc.width,
                height: desc.height,
                max,
            });
        }

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let target = Self::create(device, desc);

        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());

        if out_of_memory.is_some() {
            return Err(RenderError::OutOfMemory);
        }
        if let Some(err) = validation {
            return Err(RenderError::TextureCreationFailed(err.to_string()));
        }
        Ok(target)
    }

    fn create(device: &wgpu::Device, desc: &RenderTargetDesc) -> Self {
        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };
        let mip_level_count = if desc.generate_mipmaps {
            full_mip_count(desc.width, desc.height)
        } else {
            1
        };

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Reflection Color Texture"),
            size,
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: color_format(desc.encoding),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let render_view = color_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Reflection Render View"),
            base_mip_level: 0,
            mip_level_count: Some(1),
            ..Default::default()
        });
        let sample_view = color_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Reflection Sample View"),
            ..Default::default()
        });

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Reflection Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mipmap_filter = if mip_level_count > 1 {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        };
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Reflection Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter,
            ..Default::default()
        });

        Self {
            color_texture,
            render_view,
            sample_view,
            depth_texture,
            depth_view,
            sampler,
            desc: desc.clone(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    /// Colour encoding fixed at creation.
    pub fn encoding(&self) -> ColorEncoding {
        self.desc.encoding
    }

    /// The description this target was created from.
    pub fn desc(&self) -> &RenderTargetDesc {
        &self.desc
    }

    /// Colour texture format.
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_texture.format()
    }

    /// Number of mip levels in the colour texture.
    pub fn mip_level_count(&self) -> u32 {
        self.color_texture.mip_level_count()
    }

    /// The colour texture.
    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.color_texture
    }

    /// View of the first mip level, to render into.
    pub fn render_view(&self) -> &wgpu::TextureView {
        &self.render_view
    }

    /// View of every mip level, to sample from.
    pub fn sample_view(&self) -> &wgpu::TextureView {
        &self.sample_view
    }

    /// The depth texture.
    pub fn depth_texture(&self) -> &wgpu::Texture {
        &self.depth_texture
    }

    /// View of the depth texture.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Sampler for reading the reflection.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Reads the first mip level back as tightly packed RGBA8 rows, top row
    /// first.
    pub fn read_pixels(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> RenderResult<Vec<u8>> {
        let width = self.width();
        let height = self.height();
        let bytes_per_row = aligned_bytes_per_row(width);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Reflection Readback Buffer"),
            size: u64::from(bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("reflection readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        let data = buffer_slice.get_mapped_range();
        let row_bytes = (width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height {
            let start = (row * bytes_per_row) as usize;
            pixels.extend_from_slice(&data[start..start + row_bytes]);
        }
        drop(data);
        buffer.unmap();

        Ok(pixels)
    }
}

impl std::fmt::Debug for ReflectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReflectionTarget")
            .field("width", &self.desc.width)
            .field("height", &self.desc.height)
            .field("encoding", &self.desc.encoding)
            .field("mip_level_count", &self.mip_level_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_format_follows_encoding() {
        assert_eq!(
            color_format(ColorEncoding::Srgb),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            color_format(ColorEncoding::Linear),
            wgpu::TextureFormat::Rgba8Unorm
        );
        assert_eq!(
            format_encoding(wgpu::TextureFormat::Bgra8UnormSrgb),
            ColorEncoding::Srgb
        );
        assert_eq!(
            format_encoding(wgpu::TextureFormat::Rgba16Float),
            ColorEncoding::Linear
        );
    }

    #[test]
    fn test_full_mip_count() {
        assert_eq!(full_mip_count(1, 1), 1);
        assert_eq!(full_mip_count(512, 512), 10);
        assert_eq!(full_mip_count(1024, 256), 11);
        assert_eq!(full_mip_count(300, 200), 9);
    }

    #[test]
    fn test_aligned_bytes_per_row() {
        assert_eq!(aligned_bytes_per_row(64), 256);
        assert_eq!(aligned_bytes_per_row(65), 512);
        assert_eq!(aligned_bytes_per_row(512) % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);
    }
}
