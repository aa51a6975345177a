use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx};
use crate::device::{GpuInit, WgpuDevice};
use crate::host::ResizeSignal;
use crate::program::{ProgramConfig, ProgramContext, Scene};
use crate::time::{FrameDriver, RedrawScheduler};

use super::WindowHost;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub gpu: GpuInit,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "stipple".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            gpu: GpuInit::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.initial_size = LogicalSize::new(width, height);
        self
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, activates `program` on it and drives `app` until
    /// the window closes or the app exits.
    pub fn run<A>(config: RuntimeConfig, program: ProgramConfig, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, program, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// The context's device holds the window's surface, so the window must outlive it.
#[self_referencing]
struct WindowEntry {
    driver: FrameDriver<RedrawScheduler>,
    scheduler: RedrawScheduler,
    signal: ResizeSignal,
    scene: Scene,

    window: Window,

    #[borrows(window)]
    #[covariant]
    context: ProgramContext<WgpuDevice<'this>>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    program: ProgramConfig,
    app: A,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, program: ProgramConfig, app: A) -> Self {
        Self {
            config,
            program,
            app,
            entry: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu.clone();
        let program = &self.program;
        let signal = ResizeSignal::new();
        let listener = signal.clone();
        let scheduler = RedrawScheduler::new();

        let mut entry = WindowEntryTryBuilder {
            driver: FrameDriver::new(scheduler.clone()),
            scheduler,
            signal,
            scene: Scene::new(),
            window,
            context_builder: |w| -> Result<_> {
                let device = pollster::block_on(WgpuDevice::new(w, gpu_init))
                    .context("GPU initialization failed for window")?;
                Ok(ProgramContext::activate(device, program, &WindowHost(w), &listener))
            },
        }
        .try_build()?;

        if entry.borrow_context().program().is_none() {
            log::warn!("window opened without a usable program; frames will be empty");
        }

        entry.with_driver_mut(|driver| driver.start());
        self.entry = Some(entry);
        Ok(())
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.failure = Some(e);
            self.request_exit(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Turn the driver's frame request into a redraw.
        if let Some(entry) = &self.entry {
            entry.with(|fields| {
                if fields.scheduler.take_request().is_some() {
                    fields.window.request_redraw();
                }
            });
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                // Dropping the entry stops the driver and deregisters the resize listener.
                self.entry = None;
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = &self.entry {
                    entry.with_signal(|signal| signal.emit());
                }
            }

            WindowEvent::RedrawRequested => {
                // Split borrows to avoid `self` capture inside `ouroboros` closures.
                let (app, entry) = (&mut self.app, &mut self.entry);
                let Some(entry) = entry else { return };

                let mut control = AppControl::Continue;
                entry.with_mut(|fields| {
                    let host = WindowHost(fields.window);
                    if let Some(resize) = fields.context.poll_resize(&host) {
                        app.on_resize(&resize);
                    }

                    let Some(time) = fields.driver.fire() else { return };
                    let mut ctx = FrameCtx {
                        time,
                        stage: fields.context.stage(),
                        scene: &mut *fields.scene,
                    };
                    control = app.on_frame(&mut ctx);

                    fields.window.pre_present_notify();
                    fields.context.render(fields.scene);

                    if fields.context.device().is_lost() {
                        log::error!("GPU surface lost; shutting down");
                        control = AppControl::Exit;
                    }
                });

                if control == AppControl::Exit {
                    self.entry = None;
                    self.request_exit(event_loop);
                }
            }

            _ => {}
        }
    }
}
