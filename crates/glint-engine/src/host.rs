//! Runs one scene in a window.

use std::time::Instant;

use anyhow::Context as _;
use winit::event::WindowEvent;
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowId;

use crate::core::{App, AppControl, FrameCtx};
use crate::device::Gpu;
use crate::gl::{Context, WgpuBackend};
use crate::render_loop::{FrameOutcome, LoopConfig, RenderLoop, StopHandle};
use crate::scene::{SceneDesc, TopologyMode, initialize};
use crate::shader::FailurePolicy;
use crate::time::IntervalTimer;

struct Active {
    ctx: Context<WgpuBackend>,
    render_loop: RenderLoop,
    timer: Option<IntervalTimer>,
}

/// [`App`] that initializes `desc` on the first frame and then drives it
/// through a [`RenderLoop`].
///
/// Escape stops the loop, as does the handle from [`SceneHost::stop_handle`].
pub struct SceneHost {
    desc: SceneDesc,
    policy: FailurePolicy,
    config: LoopConfig,
    stop: StopHandle,
    active: Option<Active>,
}

impl SceneHost {
    pub fn new(desc: SceneDesc) -> Self {
        Self {
            desc,
            policy: FailurePolicy::default(),
            config: LoopConfig::default(),
            stop: StopHandle::new(),
            active: None,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_loop_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    fn start(&self, gpu: &Gpu<'_>, width: u32, height: u32) -> anyhow::Result<Active> {
        let backend = WgpuBackend::new(
            gpu.device().clone(),
            gpu.queue().clone(),
            gpu.surface_format(),
        );
        let mut ctx = Context::new(backend, width, height).context("creating GL context")?;

        let mut desc = self.desc.clone();
        if desc.spin_rate.is_some() {
            desc.spin_rate = Some(self.config.angular_rate);
        }
        let scene = initialize(&mut ctx, &desc, self.policy)
            .with_context(|| format!("initializing scene `{}`", desc.name))?;

        let timer = (scene.topology_mode() == TopologyMode::Cycle)
            .then(|| IntervalTimer::new(self.config.topology_interval, Instant::now()));

        Ok(Active {
            ctx,
            render_loop: RenderLoop::with_stop_handle(scene, self.stop.clone()),
            timer,
        })
    }
}

impl App for SceneHost {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state.is_pressed() && event.logical_key == Key::Named(NamedKey::Escape) {
                log::info!("escape pressed, stopping");
                self.stop.stop();
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, frame: &mut FrameCtx<'_, '_>) -> AppControl {
        let size = frame.gpu.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }

        if self.active.is_none() {
            match self.start(frame.gpu, size.width, size.height) {
                Ok(active) => {
                    frame
                        .runtime
                        .set_title(format!("glint - {}", active.render_loop.scene().name()));
                    self.active = Some(active);
                }
                Err(err) => {
                    frame.runtime.fail(err);
                    return AppControl::Exit;
                }
            }
        }
        let Some(active) = self.active.as_mut() else {
            return AppControl::Exit;
        };

        if active.ctx.size() != (size.width, size.height) {
            let scene = active.render_loop.scene_mut();
            if let Err(e) = scene.resize(&mut active.ctx, size.width, size.height) {
                log::warn!("resize to {}x{} failed: {e}", size.width, size.height);
            }
        }

        active.ctx.backend_mut().discard_pending();
        if active.render_loop.frame(&mut active.ctx, frame.time.timestamp_ms)
            == FrameOutcome::Stopped
        {
            return AppControl::Exit;
        }

        let backend = active.ctx.backend_mut();
        frame.present(|target| backend.encode(target))
    }

    fn on_wake(&mut self, now: Instant) -> AppControl {
        if let Some(active) = self.active.as_mut() {
            if let Some(timer) = active.timer.as_mut() {
                if timer.poll(now) {
                    active.render_loop.on_interval();
                }
            }
        }
        AppControl::Continue
    }

    fn next_wake(&self) -> Option<Instant> {
        self.active
            .as_ref()
            .and_then(|a| a.timer.as_ref())
            .map(IntervalTimer::deadline)
    }

    fn on_exit(&mut self) {
        let Some(Active {
            mut ctx,
            render_loop,
            ..
        }) = self.active.take()
        else {
            return;
        };
        log::info!("{} frames drawn", render_loop.frames());
        if let Err(e) = render_loop.into_scene().destroy(&mut ctx) {
            log::warn!("scene teardown failed: {e}");
        }
    }
}
