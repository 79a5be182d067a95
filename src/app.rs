//! Application event loop and per-frame rendering.
//!
//! [`run`] opens a window, initializes the GPU [`Context`] asynchronously and
//! then drives the loop: pointer input feeds the orbit controller, resize
//! events track the surface and camera aspect, and every host-scheduled
//! redraw renders the scene exactly once and requests the next frame.
//!
//! Lifecycle each frame:
//! 1. `RedrawRequested` arrives from the host
//! 2. The orbit controller applies accumulated input to the camera
//! 3. The camera uniform is uploaded
//! 4. The scene is rendered and the frame presented
//! 5. The next redraw is requested

use std::{iter, sync::Arc};

use instant::Instant;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{Context, MouseButtonState},
    scene::SceneDef,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Window context plus the surface status flag. Rendering is skipped until
/// the first resize configures the surface.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, scene: SceneDef) -> Self {
        let ctx = match Context::new(window, scene).await {
            Ok(ctx) => ctx,
            Err(e) => panic!(
                "App initialization failed. Cannot create the main context: {}",
                e
            ),
        };
        Self {
            ctx,
            is_surface_configured: false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = crate::texture::Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

            render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
            self.ctx.scene.draw(&self.ctx.pipelines, &mut render_pass);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub(crate) enum AppEvent {
    #[allow(dead_code)]
    Initialized(AppState),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    // Only the wasm init path sends events through the proxy.
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<AppEvent>,
    scene: SceneDef,
    state: Option<AppState>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, scene: SceneDef) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            scene,
            state: None,
            last_time: Instant::now(),
        })
    }
}

/// `RedrawRequested` is the only event that schedules a follow-up frame;
/// resize and input arms wait for the host's next tick.
fn schedules_next_frame(event: &WindowEvent) -> bool {
    matches!(event, WindowEvent::RedrawRequested)
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("gridview");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("Failed to create the window"),
        );

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut state = self
                .async_runtime
                .block_on(AppState::new(window, self.scene.clone()));
            let size = state.ctx.window.inner_size();
            state.resize(size.width, size.height);
            state.ctx.window.request_redraw();
            self.state = Some(state);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let scene = self.scene.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = AppState::new(window, scene).await;
                assert!(proxy.send_event(AppEvent::Initialized(state)).is_ok());
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Initialized(mut state) => {
                // This is the message from our wasm `spawn_local`.
                // Trigger a resize and redraw now that we are initialized.
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            let controller = &mut state.ctx.camera.controller;
            match state.ctx.mouse {
                MouseButtonState::Left => controller.handle_orbit(dx, dy),
                MouseButtonState::Right => controller.handle_pan(dx, dy),
                MouseButtonState::None => (),
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // Keep the loop going: exactly one follow-up request per frame tick.
        if schedules_next_frame(&event) {
            state.ctx.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                state.ctx.mouse = match (button, button_state.is_pressed()) {
                    (MouseButton::Left, true) => MouseButtonState::Left,
                    (MouseButton::Right, true) => MouseButtonState::Right,
                    _ => MouseButtonState::None,
                };
            }
            WindowEvent::MouseWheel { delta, .. } => {
                state.ctx.camera.controller.handle_scroll(&delta);
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                log::trace!("frame time {:?}", dt);

                // Apply accumulated input, then upload the camera uniform.
                let ctx = &mut state.ctx;
                let controller = &mut ctx.camera.controller;
                controller.update(&mut ctx.camera.camera);
                ctx.camera
                    .uniform
                    .update_view_proj(&ctx.camera.camera, &ctx.projection);
                ctx.queue.write_buffer(
                    &ctx.camera.buffer,
                    0,
                    bytemuck::cast_slice(&[ctx.camera.uniform]),
                );

                match state.render() {
                    Ok(_) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Open the demo window and run the render loop until the window is closed.
pub fn run() -> anyhow::Result<()> {
    run_with(SceneDef::demo())
}

/// Like [`run`], but rendering the given scene.
pub fn run_with(scene: SceneDef) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, scene)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

/// Browser entry point, called by wasm-bindgen once the module is loaded.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run().map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};

    #[test]
    fn only_the_frame_tick_schedules_a_redraw() {
        assert!(schedules_next_frame(&WindowEvent::RedrawRequested));

        // Resize, window moves and close must all wait for the next tick.
        assert!(!schedules_next_frame(&WindowEvent::Resized(
            PhysicalSize::new(800, 600)
        )));
        assert!(!schedules_next_frame(&WindowEvent::Moved(
            PhysicalPosition::new(10, 10)
        )));
        assert!(!schedules_next_frame(&WindowEvent::CloseRequested));
        assert!(!schedules_next_frame(&WindowEvent::Occluded(true)));
    }
}
