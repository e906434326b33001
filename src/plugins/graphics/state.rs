use std::sync::Arc;
use anyhow::{anyhow, Context};
use winit::window::Window;
use wgpu::*;

/**
 * Stores WGPU primitives needed to do any and all graphics operations.
 */
pub struct GraphicsState {
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    surface: Surface,
    surface_config: SurfaceConfiguration,
    depth_format: TextureFormat,
    depth_view: TextureView,
}

impl GraphicsState {

    /// Creates a surface for the window, and a device that can draw to it.
    /// The window must outlive the state.
    pub fn new(window: &Window, depth_format: TextureFormat) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(InstanceDescriptor::default());
        let surface = unsafe { instance.create_surface(window) }
            .context("Failed to create surface")?;
        let adapter = instance.request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        });
        let adapter = pollster::block_on(adapter)
            .ok_or_else(|| anyhow!("Compatible adapter not found"))?;
        log::info!("Using adapter {:?}", adapter.get_info());
        let device_queue = adapter.request_device(&DeviceDescriptor::default(), None);
        let (device, queue) = pollster::block_on(device_queue)
            .context("Failed to request device")?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities.formats
            .iter()
            .copied()
            .find(TextureFormat::is_srgb)
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface supports no texture formats"))?;
        let window_size = window.inner_size();
        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: window_size.width.max(1),
            height: window_size.height.max(1),
            present_mode: PresentMode::Fifo,
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);
        let depth_view = create_depth_view(&device, surface_config.width, surface_config.height, depth_format);
        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            surface,
            surface_config,
            depth_format,
            depth_view,
        })
    }

    /// Current texture view to render on.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Convenience method for getting the surface's size in pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Convenience method for getting the surface's aspect ratio (width / height).
    pub fn surface_aspect_ratio(&self) -> f32 {
        let width = self.surface_config.width as f32;
        let height = self.surface_config.height as f32;
        width / height
    }

    /// Format of the surface's texture.
    pub fn surface_format(&self) -> TextureFormat {
        self.surface_config.format
    }

    /// Format of the depth buffer.
    pub fn depth_format(&self) -> TextureFormat {
        self.depth_format
    }

    /// Texture view of the depth buffer.
    pub fn depth_view(&self) -> &TextureView {
        &self.depth_view
    }

    /// Resizes pixel size of surface.
    /// Commonly invoked when window size changes.
    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(
            &self.device,
            self.surface_config.width,
            self.surface_config.height,
            self.depth_format,
        );
    }

    /// Reconfigures the surface at its current size, after it was lost or went out of date.
    pub(crate) fn reconfigure(&mut self) {
        let (width, height) = self.surface_size();
        self.resize(width, height);
    }
}

fn create_depth_view(device: &Device, width: u32, height: u32, format: TextureFormat) -> TextureView {
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&TextureViewDescriptor::default())
}
