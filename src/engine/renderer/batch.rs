// Instanced sprite batching: every sprite submitted during a frame lands in
// one instance buffer and is drawn with a single draw call.

use super::texture::Texture;
use super::vertex::{QuadVertex, SpriteInstance};
use crate::core::geom::Rect;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use log::{error, warn};
use wgpu::util::DeviceExt;

/// Default instance capacity (an 8x8 arena with up to 5 layers per cell)
pub const DEFAULT_MAX_SPRITES: usize = 8 * 8 * 5;

/// Opacity floor; keeps the facing sign recoverable from `dir_alpha`
const ALPHA_FLOOR: f32 = 0.001;

/// Sentinel tint meaning "no color override"
const COLOR_NONE: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

/// Unit quad centered at the origin, UVs spanning one sprite cell
const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex::new([-0.5, 0.0], [0.0, 1.0]),
    QuadVertex::new([0.5, 0.0], [1.0, 1.0]),
    QuadVertex::new([0.5, 1.0], [1.0, 0.0]),
    QuadVertex::new([-0.5, 1.0], [0.0, 0.0]),
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Per-draw uniform data
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct BatchUniform {
    view_proj: [[f32; 4]; 4],
    atlas_size: [f32; 2],
    _pad: [f32; 2],
}

/// GPU resources created once by `init` and reused every frame
struct GpuState {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    atlas_bind_group: wgpu::BindGroup,
    atlas_size: [f32; 2],
}

/// Accumulates per-sprite instance records and flushes them as one
/// instanced draw per frame
pub struct SpriteBatcher {
    max_sprites: usize,
    instances: Vec<SpriteInstance>,
    gpu: Option<GpuState>,
}

impl SpriteBatcher {
    /// Create a batcher with the given instance capacity (CPU side only;
    /// call `init` before rendering)
    pub fn new(max_sprites: usize) -> Self {
        Self {
            max_sprites,
            instances: Vec::with_capacity(max_sprites),
            gpu: None,
        }
    }

    /// Create the pipeline, shared quad geometry, instance buffer, and atlas
    /// bindings. Calling this more than once is a no-op.
    pub fn init(
        &mut self,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        atlas: &Texture,
    ) {
        if self.gpu.is_some() {
            return;
        }

        // Shader module is only needed until the pipeline exists
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Batch Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let atlas_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Atlas Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &atlas_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[QuadVertex::desc(), SpriteInstance::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Facing flips mirror the quad, so winding is not stable
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Quad Index Buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Instance Buffer"),
            size: (self.max_sprites * std::mem::size_of::<SpriteInstance>())
                as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform = BatchUniform {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            atlas_size: [atlas.width as f32, atlas.height as f32],
            _pad: [0.0; 2],
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Batch Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Batch Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let atlas_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Atlas Bind Group"),
            layout: &atlas_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
        });

        self.gpu = Some(GpuState {
            pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            uniform_buffer,
            uniform_bind_group,
            atlas_bind_group,
            atlas_size: [atlas.width as f32, atlas.height as f32],
        });
    }

    /// Append one instance record.
    ///
    /// A facing of exactly zero encodes as forward (+1) and opacity is
    /// floored at 0.001, so the stored `dir_alpha` always carries a
    /// recoverable sign. Overflowing the capacity drops the record and
    /// reports the condition; it never writes past the buffer.
    pub fn submit(
        &mut self,
        quad: Rect,
        position: Vec3,
        facing: f32,
        opacity: f32,
        tint: Option<Vec4>,
    ) {
        if self.instances.len() >= self.max_sprites {
            error!(
                "sprite batch overflow: capacity {} reached, dropping sprite",
                self.max_sprites
            );
            return;
        }

        let dir = if facing < 0.0 { -1.0 } else { 1.0 };
        let alpha = opacity.max(ALPHA_FLOOR);

        self.instances.push(SpriteInstance {
            quad: quad.to_array(),
            position: position.to_array(),
            dir_alpha: dir * alpha,
            color: tint.map(|t| t.to_array()).unwrap_or(COLOR_NONE),
        });
    }

    /// Upload everything submitted since the last flush and issue one
    /// instanced draw. No-op when nothing was submitted. The write cursor
    /// is zero afterwards.
    pub fn render<'a>(
        &'a mut self,
        queue: &wgpu::Queue,
        render_pass: &mut wgpu::RenderPass<'a>,
        view_proj: Mat4,
    ) {
        if self.instances.is_empty() {
            return;
        }
        let count = self.instances.len() as u32;

        match &self.gpu {
            None => {
                warn!("sprite batcher used before init, dropping {} sprites", count);
                self.instances.clear();
                return;
            }
            Some(gpu) => {
                let uniform = BatchUniform {
                    view_proj: view_proj.to_cols_array_2d(),
                    atlas_size: gpu.atlas_size,
                    _pad: [0.0; 2],
                };
                queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
                queue.write_buffer(
                    &gpu.instance_buffer,
                    0,
                    bytemuck::cast_slice(&self.instances),
                );
            }
        }

        self.instances.clear();
        let Some(gpu) = &self.gpu else {
            return;
        };

        render_pass.set_pipeline(&gpu.pipeline);
        render_pass.set_bind_group(0, &gpu.uniform_bind_group, &[]);
        render_pass.set_bind_group(1, &gpu.atlas_bind_group, &[]);
        render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, gpu.instance_buffer.slice(..));
        render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..count);
    }

    /// Discard everything submitted since the last flush
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Number of records queued for the next flush
    pub fn sprite_count(&self) -> usize {
        self.instances.len()
    }

    /// Maximum number of records per frame
    pub fn capacity(&self) -> usize {
        self.max_sprites
    }

    #[cfg(test)]
    pub(crate) fn instances(&self) -> &[SpriteInstance] {
        &self.instances
    }
}

impl Default for SpriteBatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPRITES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit_one(batcher: &mut SpriteBatcher, facing: f32, opacity: f32) {
        batcher.submit(
            Rect::new(0.0, 0.0, 16.0, 16.0),
            Vec3::ZERO,
            facing,
            opacity,
            None,
        );
    }

    #[test]
    fn test_submit_counts_records() {
        let mut batcher = SpriteBatcher::new(4);
        assert_eq!(batcher.sprite_count(), 0);
        submit_one(&mut batcher, 1.0, 1.0);
        submit_one(&mut batcher, -1.0, 0.5);
        assert_eq!(batcher.sprite_count(), 2);
    }

    #[test]
    fn test_overflow_drops_newest_record() {
        let mut batcher = SpriteBatcher::new(3);
        for i in 0..5 {
            batcher.submit(
                Rect::new(i as f32, 0.0, 16.0, 16.0),
                Vec3::ZERO,
                1.0,
                1.0,
                None,
            );
        }
        assert_eq!(batcher.sprite_count(), 3);
        // The surviving records are the first three submitted
        assert_eq!(batcher.instances()[2].quad[0], 2.0);
    }

    #[test]
    fn test_zero_opacity_keeps_facing_sign() {
        let mut batcher = SpriteBatcher::new(4);
        submit_one(&mut batcher, -1.0, 0.0);
        let stored = batcher.instances()[0].dir_alpha;
        assert!(stored < 0.0);
        assert!(stored.abs() > 0.0);
        assert_eq!(stored.abs(), 0.001);
    }

    #[test]
    fn test_zero_facing_defaults_forward() {
        let mut batcher = SpriteBatcher::new(4);
        submit_one(&mut batcher, 0.0, 1.0);
        assert!(batcher.instances()[0].dir_alpha > 0.0);
    }

    #[test]
    fn test_no_tint_is_all_zero_sentinel() {
        let mut batcher = SpriteBatcher::new(4);
        submit_one(&mut batcher, 1.0, 1.0);
        batcher.submit(
            Rect::new(0.0, 0.0, 16.0, 16.0),
            Vec3::ZERO,
            1.0,
            1.0,
            Some(Vec4::new(1.0, 0.1, 0.1, 0.8)),
        );
        assert_eq!(batcher.instances()[0].color, [0.0; 4]);
        assert_eq!(batcher.instances()[1].color, [1.0, 0.1, 0.1, 0.8]);
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut batcher = SpriteBatcher::new(4);
        submit_one(&mut batcher, 1.0, 1.0);
        batcher.clear();
        assert_eq!(batcher.sprite_count(), 0);
        // Capacity is available again after the reset
        for _ in 0..4 {
            submit_one(&mut batcher, 1.0, 1.0);
        }
        assert_eq!(batcher.sprite_count(), 4);
    }
}
