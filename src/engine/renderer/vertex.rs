// Vertex and per-instance layouts for the sprite pipeline

use bytemuck::{Pod, Zeroable};

/// Per-vertex data for the shared unit quad
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    /// Corner position in quad space
    pub position: [f32; 2],
    /// Texture coordinates within the sprite cell
    pub uv: [f32; 2],
}

impl QuadVertex {
    pub const fn new(position: [f32; 2], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }

    /// Get the vertex buffer layout descriptor (stream 0)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Quad corner
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // UV
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// One sprite instance: 12 floats, written fresh every frame
///
/// `dir_alpha` packs facing and opacity into a single float: the sign is the
/// facing direction, the magnitude is the opacity. The magnitude is floored
/// at 0.001 so a zero opacity can never erase the sign on decode. An
/// all-zero `color` means "no tint override".
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Source rectangle in atlas texel space (x, y, w, h)
    pub quad: [f32; 4],
    /// World position
    pub position: [f32; 3],
    /// Signed facing + opacity magnitude
    pub dir_alpha: f32,
    /// Tint color (RGBA), all-zero = none
    pub color: [f32; 4],
}

impl SpriteInstance {
    /// Get the instance buffer layout descriptor (stream 1)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // Source rect
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // Position
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Facing + opacity
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 7]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32,
                },
                // Tint
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_is_twelve_floats() {
        assert_eq!(
            std::mem::size_of::<SpriteInstance>(),
            12 * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn test_layout_strides_match_structs() {
        assert_eq!(
            QuadVertex::desc().array_stride as usize,
            std::mem::size_of::<QuadVertex>()
        );
        assert_eq!(
            SpriteInstance::desc().array_stride as usize,
            std::mem::size_of::<SpriteInstance>()
        );
    }
}
