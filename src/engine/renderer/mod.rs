// Rendering system using wgpu

mod batch;
mod camera;
pub mod texture;
mod vertex;

pub use batch::{SpriteBatcher, DEFAULT_MAX_SPRITES};
pub use camera::Camera;
pub use texture::{AtlasError, Texture};
pub use vertex::{QuadVertex, SpriteInstance};

use anyhow::Result;
use glam::Vec2;
use log::{info, warn};
use std::sync::Arc;
use winit::window::Window;

const ATLAS_PATH: &str = "assets/atlas.png";

/// Main renderer: initializes wgpu, owns the fixed sprite atlas, the camera,
/// and the sprite batcher, and drives the one render pass per frame
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    batcher: SpriteBatcher,
    camera: Camera,
}

impl Renderer {
    /// Create a new renderer for the given window
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        // The atlas is fixed for the lifetime of the renderer
        let atlas = match Texture::load(&device, &queue, ATLAS_PATH) {
            Ok(atlas) => atlas,
            Err(err) => {
                warn!("{} unavailable ({}), using placeholder atlas", ATLAS_PATH, err);
                let img = texture::fallback_atlas(128, 64, 16);
                Texture::from_image(&device, &queue, &img, Some("Placeholder Atlas"))
            }
        };

        let mut batcher = SpriteBatcher::new(DEFAULT_MAX_SPRITES);
        batcher.init(&device, surface_format, &atlas);

        let mut camera = Camera::new(Vec2::new(0.0, 24.0), size.width as f32, size.height as f32);
        camera.set_zoom(4.0);

        info!(
            "Renderer initialized with {}x{} resolution, {} sprite capacity",
            size.width,
            size.height,
            batcher.capacity()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            batcher,
            camera,
        })
    }

    /// Resize the renderer
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.camera
                .resize(new_size.width as f32, new_size.height as f32);
        }
    }

    /// Render a frame: one pass, one instanced draw for every sprite
    /// submitted since the last call
    pub fn render(&mut self) -> Result<()> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.06,
                            g: 0.06,
                            b: 0.08,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let view_proj = self.camera.view_proj_matrix();
            self.batcher.render(&self.queue, &mut render_pass, view_proj);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Get a mutable reference to the sprite batcher
    pub fn batcher_mut(&mut self) -> &mut SpriteBatcher {
        &mut self.batcher
    }

    /// Get a reference to the camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Get a mutable reference to the camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}
