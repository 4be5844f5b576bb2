use crate::config::Config;
use crate::error::RenderResult;
use crate::input::{Input, PanGesture};
use crate::renderers::clear::{Clear, WHITE};
use crate::renderers::egui_renderer::EguiRenderer;
use crate::renderers::stroke_renderer::StrokeRenderer;
use crate::renderers::Renderer;
use crate::stroke::StrokeCanvas;
use crate::user_interface::{Stats, UserInterface};
use crate::vulkan::device::Device;
use crate::vulkan::instance::Instance;
use erupt::vk;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

pub struct App {
    config: Config,
    window: Window,
    device: Device,
    instance: Instance,
    clear: Clear,
    render_queue: Vec<Box<dyn Renderer>>,
    ui: UserInterface,
    canvas: StrokeCanvas,
    input: Input,
}

impl App {
    pub fn new(config: Config) -> eyre::Result<(Self, EventLoop<()>)> {
        log::info!("Starting Color Blending");
        let event_loop = EventLoop::new();
        let window = WindowBuilder::new()
            .with_title("Color Blending")
            .with_inner_size(PhysicalSize::new(config.window_width, config.window_height))
            .build(&event_loop)?;

        let instance = Instance::new(&window)?;
        let device = Device::new(&instance, &window, config.vsync)?;

        let ui = UserInterface::new(
            &window,
            device.max_texture_side(),
            config.initial_brightness,
        );

        let stroke_renderer = StrokeRenderer::new(&device, &config)?;
        let egui_renderer = EguiRenderer::new(&device)?;
        let render_queue: Vec<Box<dyn Renderer>> =
            vec![Box::new(stroke_renderer), Box::new(egui_renderer)];

        let canvas = StrokeCanvas::new(config.point_radius * window.scale_factor() as f32);

        let app = App {
            config,
            window,
            device,
            instance,
            clear: Clear::new(WHITE),
            render_queue,
            ui,
            canvas,
            input: Input::default(),
        };

        Ok((app, event_loop))
    }

    pub fn on_event(&mut self, event: Event<()>, control_flow: &mut ControlFlow) {
        *control_flow = ControlFlow::Poll;
        match event {
            Event::MainEventsCleared => {
                if let Err(err) = self.run() {
                    log::error!("Failed to draw frame: {}", err);
                }
            }
            Event::WindowEvent {
                event: window_event,
                ..
            } => {
                let ui_captured_input = self.ui.on_event(&window_event);

                match window_event {
                    WindowEvent::CloseRequested => self.close_window(control_flow),
                    WindowEvent::Resized(size) => self.resize(size),
                    WindowEvent::ScaleFactorChanged {
                        scale_factor,
                        new_inner_size,
                    } => {
                        self.canvas
                            .set_half_size(self.config.point_radius * scale_factor as f32);
                        self.resize(*new_inner_size);
                    }
                    WindowEvent::KeyboardInput { input, .. } if !ui_captured_input => {
                        self.keyboard_input(control_flow, input)
                    }
                    WindowEvent::MouseInput { button, state, .. } => {
                        let captured = ui_captured_input || self.ui.wants_pointer_input();
                        self.mouse_input(button, state, captured);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        self.cursor_moved(position);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        if let Some(gesture) = self.input.cancel() {
                            self.pan(gesture);
                        }
                    }
                    _ => {}
                }
            }
            _ => (),
        }
    }

    fn close_window(&mut self, control_flow: &mut ControlFlow) {
        log::info!("Closing Window");
        *control_flow = ControlFlow::Exit
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        log::debug!("Resizing window: {}x{}", size.width, size.height);
        self.device.resize_swapchain(vk::Extent2D {
            width: size.width,
            height: size.height,
        });
    }

    fn stats(&self) -> Stats {
        let capacity = self
            .render_queue
            .iter()
            .find_map(|renderer| renderer.downcast_ref::<StrokeRenderer>())
            .map(|renderer| renderer.capacity())
            .unwrap_or_default();

        Stats {
            strokes: self.canvas.stroke_count(),
            vertices: self.canvas.total_vertex_count(),
            stroke_capacity: capacity.strokes,
            vertex_capacity: capacity.vertices,
        }
    }

    fn run(&mut self) -> RenderResult<()> {
        puffin::GlobalProfiler::lock().new_frame();
        puffin::profile_function!();

        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let acquired_frame = self
            .device
            .acquire_swapchain_frame(&self.instance, u64::MAX)?;

        if acquired_frame.invalidate_images {
            self.device.recreate_swapchain()?;
        }

        let stats = self.stats();
        self.ui.update(&self.window, &stats);
        if self.ui.take_clear_request() {
            log::info!("Clearing {} strokes", self.canvas.stroke_count());
            self.canvas.clear();
        }

        for renderer in self.render_queue.iter_mut() {
            renderer.update(
                &mut self.device,
                &acquired_frame,
                &mut self.canvas,
                &self.ui,
            )?;
        }

        let command_buffer = *self.device.command_buffer(acquired_frame.frame_index);
        let semaphore = self.device.semaphore(acquired_frame.frame_index).handle();

        command_buffer.begin(&self.device, vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT)?;
        self.clear
            .begin(&self.device, &command_buffer, &acquired_frame);
        self.render_queue.iter().for_each(|renderer| {
            renderer.fill_command_buffer(&self.device, &command_buffer, &acquired_frame)
        });
        self.clear.end(&self.device, &command_buffer, &acquired_frame);
        command_buffer.end(&self.device)?;

        self.device.submit(
            &[vk::SemaphoreSubmitInfoBuilder::new()
                .semaphore(acquired_frame.ready)
                .stage_mask(vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT)],
            &[vk::SemaphoreSubmitInfoBuilder::new()
                .semaphore(semaphore)
                .stage_mask(vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT)],
            &[vk::CommandBufferSubmitInfoBuilder::new().command_buffer(command_buffer.handle())],
            acquired_frame.complete,
        )?;

        self.device
            .queue_present(semaphore, acquired_frame.image_index)
    }

    fn keyboard_input(&mut self, control_flow: &mut ControlFlow, input: KeyboardInput) {
        if input.state != ElementState::Pressed {
            return;
        }
        match input.virtual_keycode {
            Some(VirtualKeyCode::Escape) => self.close_window(control_flow),
            Some(VirtualKeyCode::F1) => self.ui.toggle_palette(),
            Some(VirtualKeyCode::F2) => self.ui.toggle_profiler(),
            _ => {}
        }
    }

    fn mouse_input(&mut self, button: MouseButton, state: ElementState, captured: bool) {
        if let Some(gesture) = self.input.mouse_input(button, state, captured) {
            self.pan(gesture);
        }
    }

    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if let Some(gesture) = self.input.cursor_moved(position) {
            self.pan(gesture);
        }
    }

    fn pan(&mut self, gesture: PanGesture) {
        let color = self
            .ui
            .settings()
            .color
            .stroke_color(self.config.stroke_alpha);
        match gesture {
            PanGesture::Began(location) => {
                let index = self.canvas.begin_stroke(location, color);
                log::trace!("Began stroke {} at {}", index, location);
            }
            PanGesture::Changed(location) => self.canvas.extend_stroke(location, color),
            PanGesture::Ended => log::trace!("Ended stroke"),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(err) = self.device.wait_idle() {
            log::error!("Failed to wait for device: {}", err);
        }
        self.render_queue
            .iter_mut()
            .for_each(|renderer| renderer.destroy(&mut self.device));
        self.device.destroy(&self.instance);
        self.instance.destroy();
    }
}
