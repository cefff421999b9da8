// Input routing - window ownership, key states and the pumped event loop
//
// The application owns the loop. Each iteration pumps winit without
// blocking; the zero-size stall pumps with no timeout so the thread sleeps
// until the next window event. Both go through the same InputRouter.

use anyhow::{bail, Context, Result};
use ash::vk;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

use crate::config::WindowConfig;
use crate::frame::WindowSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    NotPressed,
    /// Went down since the last `end_frame`
    Pressed,
    Held,
}

/// Anything with a pressed/released state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Key(KeyCode),
    Mouse(MouseButton),
}

impl From<KeyCode> for Button {
    fn from(key: KeyCode) -> Self {
        Button::Key(key)
    }
}

impl From<MouseButton> for Button {
    fn from(button: MouseButton) -> Self {
        Button::Mouse(button)
    }
}

/// Per-button state with hit semantics: a key or mouse button is "hit"
/// only on the frame it went down.
#[derive(Debug, Default)]
pub struct KeyStates {
    keys: HashMap<Button, KeyState>,
}

impl KeyStates {
    pub fn press(&mut self, button: impl Into<Button>) {
        let state = self.keys.entry(button.into()).or_default();
        if *state == KeyState::NotPressed {
            *state = KeyState::Pressed;
        }
    }

    pub fn release(&mut self, button: impl Into<Button>) {
        self.keys.insert(button.into(), KeyState::NotPressed);
    }

    pub fn state(&self, button: impl Into<Button>) -> KeyState {
        self.keys.get(&button.into()).copied().unwrap_or_default()
    }

    pub fn is_hit(&self, button: impl Into<Button>) -> bool {
        self.state(button) == KeyState::Pressed
    }

    pub fn is_down(&self, button: impl Into<Button>) -> bool {
        self.state(button) != KeyState::NotPressed
    }

    /// Pressed keys become held
    pub fn end_frame(&mut self) {
        for state in self.keys.values_mut() {
            if *state == KeyState::Pressed {
                *state = KeyState::Held;
            }
        }
    }
}

/// The winit application handler used for every pump
pub struct InputRouter {
    window_config: WindowConfig,
    window: Option<Arc<Window>>,
    window_error: Option<String>,
    is_fullscreen: bool,

    keys: KeyStates,
    close_requested: bool,
    resized: Option<vk::Extent2D>,
    ui_events: Vec<WindowEvent>,
}

impl InputRouter {
    pub fn new(window_config: WindowConfig) -> Self {
        let is_fullscreen = window_config.fullscreen;
        Self {
            window_config,
            window: None,
            window_error: None,
            is_fullscreen,
            keys: KeyStates::default(),
            close_requested: false,
            resized: None,
            ui_events: Vec::new(),
        }
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }

    pub fn keys(&self) -> &KeyStates {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut KeyStates {
        &mut self.keys
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    /// Latest non-zero resize since the last call
    pub fn take_resize(&mut self) -> Option<vk::Extent2D> {
        self.resized.take()
    }

    /// Events for the overlay, oldest first
    pub fn take_ui_events(&mut self) -> Vec<WindowEvent> {
        std::mem::take(&mut self.ui_events)
    }

    pub fn toggle_fullscreen(&mut self) {
        let Some(window) = &self.window else {
            return;
        };

        self.is_fullscreen = !self.is_fullscreen;
        if self.is_fullscreen {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
            log::info!("Entered fullscreen mode");
        } else {
            window.set_fullscreen(None);
            log::info!("Exited fullscreen mode");
        }
    }

    pub fn framebuffer_size(&self) -> vk::Extent2D {
        self.window
            .as_ref()
            .map(|window| {
                let size = window.inner_size();
                vk::Extent2D {
                    width: size.width,
                    height: size.height,
                }
            })
            .unwrap_or_default()
    }
}

impl ApplicationHandler for InputRouter {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut attributes = WindowAttributes::default()
            .with_title(&self.window_config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));
        if self.window_config.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                log::error!("Failed to create window: {:?}", e);
                self.window_error = Some(e.to_string());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}", size.width, size.height);
                if size.width > 0 && size.height > 0 {
                    self.resized = Some(vk::Extent2D {
                        width: size.width,
                        height: size.height,
                    });
                }
            }
            WindowEvent::KeyboardInput { event: key, .. } => {
                if let PhysicalKey::Code(code) = key.physical_key {
                    match key.state {
                        ElementState::Pressed if !key.repeat => self.keys.press(code),
                        ElementState::Released => self.keys.release(code),
                        _ => {}
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.keys.press(*button),
                ElementState::Released => self.keys.release(*button),
            },
            _ => {}
        }

        self.ui_events.push(event);
    }
}

/// Owns the event loop and drives it by pumping
pub struct WindowPump {
    event_loop: EventLoop<()>,
    router: InputRouter,
}

impl WindowPump {
    /// Create the event loop and pump until the window exists
    pub fn new(window_config: WindowConfig) -> Result<Self> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        let mut pump = Self {
            event_loop,
            router: InputRouter::new(window_config),
        };

        while pump.router.window.is_none() {
            if let PumpStatus::Exit(code) = pump.pump(Some(Duration::ZERO)) {
                let reason = pump.router.window_error.take().unwrap_or_default();
                bail!("Event loop exited ({}) before a window was created: {}", code, reason);
            }
        }
        Ok(pump)
    }

    fn pump(&mut self, timeout: Option<Duration>) -> PumpStatus {
        let status = self.event_loop.pump_app_events(timeout, &mut self.router);
        if let PumpStatus::Exit(_) = status {
            self.router.request_close();
        }
        status
    }

    /// Handle everything pending without blocking
    pub fn poll(&mut self) {
        self.pump(Some(Duration::ZERO));
    }

    pub fn window(&self) -> Result<Arc<Window>> {
        self.router.window().cloned().context("Window is not available")
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut InputRouter {
        &mut self.router
    }
}

impl WindowSystem for WindowPump {
    fn framebuffer_size(&self) -> vk::Extent2D {
        self.router.framebuffer_size()
    }

    fn wait_events(&mut self) {
        self.pump(None);
    }

    fn close_requested(&self) -> bool {
        self.router.close_requested()
    }
}
