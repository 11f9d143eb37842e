//! Interactive fur viewer: load an OBJ (or generate a sphere), expand it into
//! shells, and render with furlite.
//! Run from repo root: cargo run -p viewer --bin fur_viewer [-- mesh.obj]
//!
//! Controls: left-drag rotates, right-drag pans, scroll zooms. L/K grow and
//! shrink the fur, M/N raise and lower the density, B leans the fur in a
//! random direction, Up/Down change the shell count (rebuilds the geometry).

use std::sync::Arc;

use furlite::{
    expand, FurConfig, FurError, FurMaterial, FurParameters, GpuMeshBuffer, Mesh, OrbitCamera,
    Renderer,
};
use glam::Mat4;
use rand::Rng;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

const LENGTH_STEP: f32 = 0.02;
const DENSITY_STEP: f32 = 1.0;
const DEFAULT_LAYERS: u32 = 16;

struct Gpu {
    surface: wgpu::Surface<'static>,
    surface_format: wgpu::TextureFormat,
    renderer: Renderer,
    material: FurMaterial,
    mesh_buffer: GpuMeshBuffer,
}

impl Gpu {
    fn new(window: Arc<Window>, base_mesh: &Mesh, layers: u32) -> Result<Self, FurError> {
        pollster::block_on(Self::new_async(window, base_mesh, layers))
    }

    async fn new_async(
        window: Arc<Window>,
        base_mesh: &Mesh,
        layers: u32,
    ) -> Result<Self, FurError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| FurError::Gpu(e.to_string()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| FurError::Gpu("no compatible adapter".to_string()))?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .map_err(|e| FurError::Gpu(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .first()
            .copied()
            .unwrap_or(wgpu::TextureFormat::Rgba8Unorm);
        let config = FurConfig {
            swapchain_format: surface_format,
            ..FurConfig::default()
        };
        let renderer = Renderer::new(device, queue, config)?;
        let material = renderer.create_material(FurParameters::default())?;

        let mut mesh_buffer = GpuMeshBuffer::new();
        // Shell positions stay at the base surface; the shader applies the
        // current length, so interactive length changes never re-expand.
        let shell = expand(base_mesh, layers, 0.0)?;
        mesh_buffer.upload(renderer.device(), renderer.queue(), &shell)?;

        Ok(Self {
            surface,
            surface_format,
            renderer,
            material,
            mesh_buffer,
        })
    }

    fn configure(&self, width: u32, height: u32) {
        self.surface.configure(
            self.renderer.device(),
            &wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: self.surface_format,
                width: width.max(1),
                height: height.max(1),
                present_mode: wgpu::PresentMode::Fifo,
                alpha_mode: wgpu::CompositeAlphaMode::Opaque,
                view_formats: vec![],
                desired_maximum_frame_latency: 2,
            },
        );
    }

    /// Changing the shell count fully replaces the GPU buffers: the new shell
    /// is built before the old set is released, never mutated in place.
    fn rebuild_shells(&mut self, base_mesh: &Mesh, layers: u32) -> Result<(), FurError> {
        let shell = expand(base_mesh, layers, 0.0)?;
        self.mesh_buffer
            .upload(self.renderer.device(), self.renderer.queue(), &shell)
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    base_mesh: Mesh,
    layers: u32,
    camera: OrbitCamera,
    size: (u32, u32),
    cursor: Option<(f64, f64)>,
    left_down: bool,
    right_down: bool,
}

impl App {
    fn new(base_mesh: Mesh) -> Self {
        Self {
            window: None,
            gpu: None,
            base_mesh,
            layers: DEFAULT_LAYERS,
            camera: OrbitCamera::new(4.0),
            size: (800, 600),
            cursor: None,
            left_down: false,
            right_down: false,
        }
    }

    fn set_layers(&mut self, layers: u32) {
        if layers == self.layers {
            return;
        }
        if let Some(gpu) = &mut self.gpu {
            match gpu.rebuild_shells(&self.base_mesh, layers) {
                Ok(()) => {
                    self.layers = layers;
                    log::info!("shell count: {layers}");
                }
                Err(e) => log::error!("shell rebuild failed: {e}"),
            }
        } else {
            self.layers = layers;
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: Key<&str>) {
        let Some(gpu) = &mut self.gpu else { return };
        let params = gpu.material.params_mut();
        match key {
            Key::Character("l" | "L") => params.set_length(params.length() + LENGTH_STEP),
            Key::Character("k" | "K") => params.set_length(params.length() - LENGTH_STEP),
            Key::Character("m" | "M") => params.set_density(params.density() + DENSITY_STEP),
            Key::Character("n" | "N") => params.set_density(params.density() - DENSITY_STEP),
            Key::Character("b" | "B") => {
                let mut rng = rand::rng();
                let theta = rng.random_range(0.0..std::f32::consts::TAU);
                let phi = rng.random_range(0.0..std::f32::consts::TAU);
                params.set_direction(theta, phi);
            }
            Key::Named(NamedKey::ArrowUp) => self.set_layers(self.layers + 1),
            Key::Named(NamedKey::ArrowDown) => self.set_layers(self.layers.saturating_sub(1).max(1)),
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if self.gpu.is_none() {
            // One-time setup: Uninitialized -> Ready.
            match Gpu::new(window.clone(), &self.base_mesh, self.layers) {
                Ok(gpu) => {
                    gpu.configure(self.size.0, self.size.1);
                    self.gpu = Some(gpu);
                }
                Err(e) => {
                    log::error!("gpu setup failed: {e}");
                    event_loop.exit();
                    return;
                }
            }
        }
        let gpu = match &mut self.gpu {
            Some(gpu) => gpu,
            None => return,
        };

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.configure(self.size.0, self.size.1);
                match gpu.surface.get_current_texture() {
                    Ok(frame) => frame,
                    Err(e) => {
                        log::error!("surface unrecoverable: {e}");
                        event_loop.exit();
                        return;
                    }
                }
            }
            Err(wgpu::SurfaceError::Timeout) => {
                window.request_redraw();
                return;
            }
            Err(e) => {
                log::error!("surface error: {e}");
                event_loop.exit();
                return;
            }
        };

        let surface_view = frame.texture.create_view(&Default::default());
        let (width, height) = self.size;
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let proj = OrbitCamera::projection(60f32.to_radians(), aspect, 0.05, 100.0);

        let result = gpu.renderer.render_frame(
            &surface_view,
            width,
            height,
            proj,
            self.camera.view(),
            Mat4::IDENTITY,
            &mut gpu.material,
            &gpu.mesh_buffer,
        );
        match result {
            Ok(command_buffer) => {
                gpu.renderer.submit([command_buffer]);
                window.pre_present_notify();
                frame.present();
            }
            Err(e) => {
                log::error!("frame failed: {e}");
                event_loop.exit();
                return;
            }
        }
        // Unconditional next tick; Fifo presentation paces the loop.
        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("Fur Effect")
            .with_inner_size(winit::dpi::LogicalSize::new(800, 600));
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                let phys = window.inner_size();
                self.size = (phys.width.max(1), phys.height.max(1));
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("window creation failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(physical) => {
                self.size = (physical.width.max(1), physical.height.max(1));
                if let Some(gpu) = &self.gpu {
                    gpu.configure(self.size.0, self.size.1);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.left_down = pressed,
                    MouseButton::Right => self.right_down = pressed,
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((last_x, last_y)) = self.cursor {
                    let dx = (position.x - last_x) as f32;
                    let dy = (position.y - last_y) as f32;
                    if self.left_down {
                        self.camera.rotate(dy, dx);
                    }
                    if self.right_down {
                        // Screen y grows downward.
                        self.camera.translate(-dx, dy);
                    }
                }
                self.cursor = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 50.0) as f32,
                };
                self.camera.zoom(-amount);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    let key = event.logical_key.as_ref();
                    self.handle_key(event_loop, key);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let base_mesh = match std::env::args().nth(1) {
        Some(path) => furlite::load_obj(&path)?,
        None => Mesh::uv_sphere(32, 48)?,
    };

    let event_loop = winit::event_loop::EventLoop::new()?;
    let mut app = App::new(base_mesh);
    event_loop.run_app(&mut app)?;
    Ok(())
}
