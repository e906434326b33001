use std::time::{Duration, Instant};
use anyhow::Context;
use glam::UVec2;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{EventLoop, EventLoopWindowTarget};
use winit::keyboard::PhysicalKey;
use winit::window::{Window as WinitWindow, WindowBuilder};
use crate::{init_graphics, App, AppBuilder, AppRunner, GraphicsState, Keyboard, Plugin};

/// Adds a runner that opens a window, renders to it, and is synced with the framerate.
pub struct WindowPlugin {
    pub title: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for WindowPlugin {
    fn default() -> Self {
        Self {
            title: "Shooter".to_owned(),
            window_width: 800,
            window_height: 600,
        }
    }
}

impl Plugin for WindowPlugin {
    fn install(&mut self, builder: &mut AppBuilder) {
        builder.game().init(|_| Window {
            size: UVec2::new(self.window_width, self.window_height),
        });
        builder.runner(WindowRunner {
            title: self.title.clone(),
            window_width: self.window_width,
            window_height: self.window_height,
        });
    }
}

/// Window domain.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Window {
    /// Size of the window's inner content in pixels.
    size: UVec2,
}

impl Window {

    pub fn size(&self) -> UVec2 {
        self.size
    }
}

/**
 * Opens a window and uses it to power an underlying [`App`].
 * For rendering applications on Windows, Linux and OSX.
 */
pub struct WindowRunner {
    title: String,
    window_width: u32,
    window_height: u32,
}

impl AppRunner for WindowRunner {
    fn run(&mut self, mut app: App) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        let window = WindowBuilder::new()
            .with_title(&self.title)
            .with_inner_size(PhysicalSize::new(self.window_width, self.window_height))
            .build(&event_loop)
            .context("Failed to create window")?;
        init_graphics(&mut app.game, &window)?;
        log::info!("Opened window '{}' at {}x{}", self.title, self.window_width, self.window_height);

        // Starts game loop
        let mut last_update: Option<Instant> = None;
        window.request_redraw();
        event_loop.run(move |event, target| {
            if let Event::WindowEvent { event, .. } = event {
                handle_window_event(event, &window, target, &mut app, &mut last_update);
            }
        })?;
        Ok(())
    }
}

fn handle_window_event(
    event: WindowEvent,
    window: &WinitWindow,
    target: &EventLoopWindowTarget<()>,
    app: &mut App,
    last_update: &mut Option<Instant>,
) {
    match event {
        WindowEvent::Resized(size) => {
            app.game.get::<&mut Window>().size = UVec2::new(size.width, size.height);
            if let Some(mut state) = app.game.try_get::<&mut GraphicsState>() {
                state.resize(size.width, size.height);
            }
        },
        WindowEvent::KeyboardInput { event, .. } => {
            let key_code = match event.physical_key {
                PhysicalKey::Code(key_code) => key_code,
                PhysicalKey::Unidentified(_) => return,
            };
            let mut keyboard = app.game.get::<&mut Keyboard>();
            match event.state {
                ElementState::Pressed => keyboard.press(key_code),
                ElementState::Released => keyboard.release(key_code),
            }
        },
        WindowEvent::RedrawRequested => {
            run_game_logic(app, last_update, target);   // Game logic
            window.request_redraw();                    // Submits request to render next frame
        },
        WindowEvent::CloseRequested => {
            log::info!("Window closed");
            target.exit();
        },
        _ => {}
    }
}

fn run_game_logic(
    app: &mut App,
    last_update: &mut Option<Instant>,
    target: &EventLoopWindowTarget<()>,
) {
    // Computes delta since last frame.
    let now = Instant::now();
    let delta = match *last_update {
        Some(last_update) => now.duration_since(last_update),
        None => Duration::ZERO,
    };
    *last_update = Some(now);

    app.run_frame(delta);

    if app.quit_requested() {
        log::info!("Quit requested");
        target.exit();
    }
}


#[cfg(test)]
mod test {
    use glam::UVec2;
    use crate::{App, Window, WindowPlugin};

    #[test]
    fn installs_window_domain() {
        let mut builder = App::builder();
        builder.plugin(WindowPlugin {
            title: "Test".to_owned(),
            window_width: 1280,
            window_height: 720,
        });
        let app = builder.build();
        let window = app.game.get::<&Window>();
        assert_eq!(UVec2::new(1280, 720), window.size());
    }
}
