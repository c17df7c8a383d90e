// Sprite atlas texture creation

use image::GenericImageView;
use std::path::Path;

/// Atlas loading errors
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("failed to read atlas file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode atlas image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A GPU texture with its view and sampler
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Load and decode a texture from a file path
    pub fn load<P: AsRef<Path>>(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: P,
    ) -> Result<Self, AtlasError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(device, queue, &bytes, &path.as_ref().to_string_lossy())
    }

    /// Create a texture from encoded image bytes
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self, AtlasError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(device, queue, &img, Some(label)))
    }

    /// Create a texture from a decoded image
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
    ) -> Self {
        let rgba = img.to_rgba8();
        let dimensions = img.dimensions();

        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        // Pixel-art atlas: nearest filtering, clamped edges
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width: dimensions.0,
            height: dimensions.1,
        }
    }
}

/// Placeholder atlas used when no atlas file is present, so the binary
/// still runs without shipped assets. A cell-sized checkerboard makes
/// sprite bounds visible.
pub fn fallback_atlas(width: u32, height: u32, cell: u32) -> image::DynamicImage {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            image::Rgba([200, 80, 200, 255])
        } else {
            image::Rgba([40, 40, 48, 255])
        }
    });
    image::DynamicImage::ImageRgba8(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_atlas_dimensions() {
        let img = fallback_atlas(128, 64, 16);
        assert_eq!(img.width(), 128);
        assert_eq!(img.height(), 64);
    }

    #[test]
    fn test_fallback_atlas_checker_pattern() {
        let img = fallback_atlas(128, 64, 16).to_rgba8();
        assert_ne!(img.get_pixel(0, 0), img.get_pixel(16, 0));
        assert_eq!(img.get_pixel(0, 0), img.get_pixel(32, 0));
    }

    #[test]
    fn test_atlas_error_display() {
        let err = AtlasError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(err.to_string().contains("failed to read atlas file"));
    }
}
