//! Frame driver for the windowed viewer.

use std::collections::HashSet;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use gridcaster::renderer::render_frame;
use gridcaster::scaler::{ScaleLut, blit_nearest_stretch, build_scale_lut};
use gridcaster::{Config, Framebuffer, Grid, Intents, Result, Simulation};

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    sim: Simulation,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal buffer at the configured resolution
    fb: Framebuffer,
    scale_lut: ScaleLut,

    // Input and timing
    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
    tick_interval: Duration,
}

impl App {
    fn new(sim: Simulation) -> Self {
        let config = sim.config();
        let fb = Framebuffer::new(config.screen_width as usize, config.screen_height as usize);
        let tick_interval = config.tick_interval();
        Self {
            window: None,
            surface: None,
            sim,
            frame_counter: 0,
            last_fps_print: Instant::now(),
            fb,
            scale_lut: ScaleLut::empty(),
            keys_down: HashSet::new(),
            last_tick: Instant::now(),
            tick_interval,
        }
    }

    fn intents(&self) -> Intents {
        let down = |a: KeyCode, b: KeyCode| self.keys_down.contains(&a) || self.keys_down.contains(&b);
        Intents {
            left: down(KeyCode::ArrowLeft, KeyCode::KeyA),
            right: down(KeyCode::ArrowRight, KeyCode::KeyD),
            forward: down(KeyCode::ArrowUp, KeyCode::KeyW),
            back: down(KeyCode::ArrowDown, KeyCode::KeyS),
        }
    }

    /// Tick and redraw the internal buffer if a tick interval has elapsed.
    /// The remainder carries over so the average rate stays on target.
    fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        if elapsed < self.tick_interval {
            return;
        }
        let carry = elapsed.as_secs_f64() % self.tick_interval.as_secs_f64();
        self.last_tick = now - Duration::from_secs_f64(carry);

        let intents = self.intents();
        self.sim.tick(&intents);
        render_frame(&mut self.fb, &self.sim);
        self.frame_counter += 1;
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                self.keys_down.insert(code);
            }
            ElementState::Released => {
                self.keys_down.remove(&code);
                return;
            }
        }
        if repeat {
            return;
        }

        let options = &mut self.sim.options;
        match code {
            KeyCode::KeyM => {
                options.show_minimap = !options.show_minimap;
                log::info!("Minimap: {}", options.show_minimap);
            }
            KeyCode::KeyT => {
                options.textures = !options.textures;
                log::info!("Textures: {}", options.textures);
            }
            KeyCode::Escape => event_loop.exit(),
            _ => (),
        }
    }

    fn present(&mut self, id: WindowId) {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return,
        };

        let size = window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return; // Minimized window, skip drawing
        };
        let (dw, dh) = (size.width as usize, size.height as usize);

        if let Err(e) = surface.resize(w, h) {
            log::warn!("Surface resize failed: {e}");
            return;
        }
        if !self.scale_lut.fits(dw, dh) {
            self.scale_lut = build_scale_lut(dw, dh, self.fb.width(), self.fb.height());
        }

        let mut buf = match surface.buffer_mut() {
            Ok(buf) => buf,
            Err(e) => {
                log::warn!("Failed to map surface buffer: {e}");
                return;
            }
        };
        blit_nearest_stretch(&mut buf, self.fb.pixels(), &self.scale_lut);
        if let Err(e) = buf.present() {
            log::error!("Present failed: {e}");
        }
    }

    fn log_fps(&mut self) {
        let now = Instant::now();
        let secs = now.duration_since(self.last_fps_print).as_secs_f32();
        if secs >= 1.0 {
            log::info!("FPS: {:.1}", self.frame_counter as f32 / secs);
            self.frame_counter = 0;
            self.last_fps_print = now;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let config = self.sim.config();
        let attributes = Window::default_attributes()
            .with_title("gridcaster")
            .with_inner_size(LogicalSize::new(config.screen_width, config.screen_height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Rc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        match surface {
            Ok(surface) => self.surface = Some(surface),
            Err(e) => {
                log::error!("Failed to create softbuffer surface: {e}");
                event_loop.exit();
                return;
            }
        }

        let size = window.inner_size();
        log::info!("Window created at {}x{}", size.width, size.height);
        self.scale_lut = build_scale_lut(
            size.width as usize,
            size.height as usize,
            self.fb.width(),
            self.fb.height(),
        );

        render_frame(&mut self.fb, &self.sim);
        self.last_tick = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => self.on_key(event_loop, code, state, repeat),

            WindowEvent::Focused(false) => self.keys_down.clear(),

            WindowEvent::RedrawRequested => {
                self.tick();
                self.present(id);
                self.log_fps();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// `gridcaster [MAP.json] [CONFIG.json]`
fn load() -> Result<Simulation> {
    let mut args = std::env::args().skip(1);

    let grid = match args.next() {
        Some(path) => Grid::load(path)?,
        None => {
            log::info!("No map given, using the built-in sample");
            Grid::sample()?
        }
    };
    let config = match args.next() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    Simulation::new(grid, config)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let sim = match load() {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {e}");
            std::process::exit(1);
        }
    };

    // ControlFlow::Wait pauses the event loop if no events are available to process.
    // Redraws are requested continuously from about_to_wait, and ticks are
    // throttled to the configured rate in App::tick.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(sim);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {e}");
    }
}
