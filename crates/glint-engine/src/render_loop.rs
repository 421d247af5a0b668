//! Per-frame steady state: clear, animate, draw.
//!
//! The loop never schedules itself. The host calls [`RenderLoop::frame`]
//! once per display frame and [`RenderLoop::on_interval`] from a separate
//! wall-clock timer; the two share only the topology tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::gl::{Backend, Context, GlError, Topology};
use crate::scene::{Scene, TopologyMode};
use crate::transform::DEFAULT_ANGULAR_RATE;

/// Loop timing knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// Cadence of the topology tick.
    pub topology_interval: Duration,
    /// Spin rate in radians per millisecond, for scenes that spin.
    pub angular_rate: f32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            topology_interval: Duration::from_millis(1000),
            angular_rate: DEFAULT_ANGULAR_RATE,
        }
    }
}

/// Topology for a given tick: `Topology::ALL[tick % 7]`.
pub fn topology_for_tick(tick: u64) -> Topology {
    Topology::ALL[(tick % Topology::ALL.len() as u64) as usize]
}

/// Counter behind the cycling topology.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TopologyCycle {
    tick: u64,
}

impl TopologyCycle {
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn current(&self) -> Topology {
        topology_for_tick(self.tick)
    }

    pub fn advance(&mut self) -> Topology {
        self.tick = self.tick.wrapping_add(1);
        self.current()
    }
}

/// Cancellation flag checked at the top of every frame.
///
/// Cheap to clone; may be triggered from any thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Frame recorded; schedule the next one.
    Continue,
    /// The stop handle fired; nothing was drawn.
    Stopped,
}

/// Drives one [`Scene`] frame after frame.
#[derive(Debug)]
pub struct RenderLoop {
    scene: Scene,
    cycle: TopologyCycle,
    stop: StopHandle,
    frames: u64,
    /// Set after the first failed frame so a broken scene logs once, not
    /// sixty times a second.
    failing: bool,
}

impl RenderLoop {
    pub fn new(scene: Scene) -> Self {
        Self::with_stop_handle(scene, StopHandle::new())
    }

    pub fn with_stop_handle(scene: Scene, stop: StopHandle) -> Self {
        Self {
            scene,
            cycle: TopologyCycle::default(),
            stop,
            frames: 0,
            failing: false,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Hands the scene back, e.g. to destroy it.
    pub fn into_scene(self) -> Scene {
        self.scene
    }

    pub fn cycle(&self) -> TopologyCycle {
        self.cycle
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Interval timer callback: moves the topology tick forward.
    pub fn on_interval(&mut self) {
        let next = self.cycle.advance();
        if self.scene.topology_mode() == TopologyMode::Cycle {
            log::debug!("topology tick {} -> {next:?}", self.cycle.tick());
        }
    }

    /// Topology the next frame draws with.
    pub fn active_topology(&self) -> Topology {
        match self.scene.topology_mode() {
            TopologyMode::Fixed(topology) => topology,
            TopologyMode::Cycle => self.cycle.current(),
        }
    }

    /// Runs one frame at `timestamp_ms`.
    ///
    /// GL errors do not end the loop: the first is logged at `error`, repeats
    /// at `trace`, and the loop keeps going.
    pub fn frame<B: Backend>(&mut self, ctx: &mut Context<B>, timestamp_ms: f64) -> FrameOutcome {
        if self.stop.is_stopped() {
            return FrameOutcome::Stopped;
        }

        match self.draw(ctx, timestamp_ms) {
            Ok(()) => {
                if self.failing {
                    log::info!("scene `{}` is drawing again", self.scene.name());
                    self.failing = false;
                }
            }
            Err(e) if !self.failing => {
                log::error!("scene `{}` frame failed: {e}", self.scene.name());
                self.failing = true;
            }
            Err(e) => log::trace!("frame {} failed: {e}", self.frames),
        }

        self.frames += 1;
        FrameOutcome::Continue
    }

    fn draw<B: Backend>(&mut self, ctx: &mut Context<B>, timestamp_ms: f64) -> Result<(), GlError> {
        ctx.clear(self.scene.clear_mask())?;
        self.scene.animate(ctx, timestamp_ms)?;
        let topology = self.active_topology();
        log::trace!("frame {} at {timestamp_ms:.1} ms: {topology:?}", self.frames);
        self.scene.draw(ctx, topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{ClearMask, Command, DrawKind, IndexType, RecordingBackend, UniformSlot};
    use crate::scene::{SceneDesc, initialize, presets};
    use crate::shader::FailurePolicy;

    fn start(desc: SceneDesc) -> (Context<RecordingBackend>, RenderLoop) {
        let mut ctx = Context::new(RecordingBackend::new(), 640, 480).unwrap();
        let scene = initialize(&mut ctx, &desc, FailurePolicy::Permissive).unwrap();
        ctx.backend_mut().take_commands();
        (ctx, RenderLoop::new(scene))
    }

    fn clears(commands: &[Command]) -> Vec<(ClearMask, [f32; 4])> {
        commands
            .iter()
            .filter_map(|c| match c {
                Command::Clear { mask, color } => Some((*mask, *color)),
                _ => None,
            })
            .collect()
    }

    // ── topology tick ─────────────────────────────────────────────────────

    #[test]
    fn tick_walks_seven_modes_in_order() {
        let expected = [
            Topology::Points,
            Topology::LineStrip,
            Topology::LineLoop,
            Topology::Lines,
            Topology::TriangleStrip,
            Topology::TriangleFan,
            Topology::Triangles,
        ];
        for tick in 0..70u64 {
            assert_eq!(topology_for_tick(tick), expected[(tick % 7) as usize]);
        }
        assert_eq!(topology_for_tick(u64::MAX), expected[(u64::MAX % 7) as usize]);
    }

    #[test]
    fn cycle_advances_and_wraps() {
        let mut cycle = TopologyCycle::default();
        assert_eq!(cycle.current(), Topology::Points);
        for _ in 0..6 {
            cycle.advance();
        }
        assert_eq!(cycle.current(), Topology::Triangles);
        assert_eq!(cycle.advance(), Topology::Points);
        assert_eq!(cycle.tick(), 7);
    }

    #[test]
    fn stop_handle_is_shared() {
        let handle = StopHandle::new();
        let clone = handle.clone();
        assert!(!handle.is_stopped());
        clone.stop();
        assert!(handle.is_stopped());
    }

    #[test]
    fn stop_from_another_thread() {
        let handle = StopHandle::new();
        let remote = handle.clone();
        std::thread::spawn(move || remote.stop()).join().unwrap();
        assert!(handle.is_stopped());
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn static_triangle_clears_then_draws_three_vertices() {
        let (mut ctx, mut render_loop) = start(presets::static_triangle());

        for ts in [0.0, 16.0, 33.0] {
            assert_eq!(render_loop.frame(&mut ctx, ts), FrameOutcome::Continue);
        }

        let commands = ctx.backend().commands();
        let cleared = clears(commands);
        assert_eq!(cleared.len(), 3);
        assert!(
            cleared
                .iter()
                .all(|&(mask, color)| mask == ClearMask::COLOR && color == presets::CLEAR_COLOR)
        );

        let draws: Vec<_> = ctx.backend().draws().collect();
        assert_eq!(draws.len(), 3);
        for draw in draws {
            assert_eq!(draw.topology, Topology::Triangles);
            assert_eq!(draw.kind, DrawKind::Arrays { first: 0, count: 3 });
            assert!(!draw.depth_test);
        }
        assert_eq!(render_loop.frames(), 3);
    }

    #[test]
    fn indexed_quad_draws_six_short_indices() {
        let (mut ctx, mut render_loop) = start(presets::indexed_quad());
        render_loop.frame(&mut ctx, 0.0);

        let draw = ctx.backend().draws().next().unwrap();
        let index_buffer = render_loop.scene().index_buffer().unwrap();
        assert_eq!(
            draw.kind,
            DrawKind::Elements {
                buffer: index_buffer,
                count: 6,
                index_type: IndexType::UnsignedShort,
                offset: 0,
            }
        );
        assert_eq!(draw.attributes.len(), 2);
    }

    #[test]
    fn rotating_triangle_accumulates_spin() {
        let (mut ctx, mut render_loop) = start(presets::rotating_triangle());

        for ts in [0.0, 16.0, 33.0] {
            render_loop.frame(&mut ctx, ts);
        }

        let scene = render_loop.scene();
        assert!((scene.spin_angle() - 0.066).abs() < 1e-5);
        let model = scene.model().unwrap();
        assert!(model.abs_diff_eq(glam::Mat4::from_rotation_z(0.066), 1e-5));

        let last = ctx.backend().draws().last().unwrap();
        assert!(last.depth_test);
        let model_slot = UniformSlot { group: 0, binding: 2 };
        let uploaded = last.uniforms.iter().find(|u| u.slot == model_slot).unwrap();
        assert_eq!(
            uploaded.bytes.as_slice(),
            bytemuck::cast_slice::<f32, u8>(&model.to_cols_array())
        );

        let cleared = clears(ctx.backend().commands());
        assert!(cleared.iter().all(|&(mask, _)| mask == ClearMask::COLOR | ClearMask::DEPTH));
    }

    #[test]
    fn cycle_scene_follows_interval_ticks() {
        let (mut ctx, mut render_loop) = start(presets::topology_cycle());

        for _ in 0..14 {
            render_loop.frame(&mut ctx, 0.0);
            render_loop.on_interval();
        }

        let drawn: Vec<_> = ctx.backend().draws().map(|d| d.topology).collect();
        let expected: Vec<_> = (0..14).map(topology_for_tick).collect();
        assert_eq!(drawn, expected);
    }

    #[test]
    fn fixed_scene_ignores_interval_ticks() {
        let (mut ctx, mut render_loop) = start(presets::point_cloud());
        for _ in 0..3 {
            render_loop.on_interval();
            render_loop.frame(&mut ctx, 0.0);
        }
        assert!(ctx.backend().draws().all(|d| d.topology == Topology::Points));
        assert_eq!(render_loop.cycle().tick(), 3);
    }

    #[test]
    fn program_links_once_across_frames() {
        let mut ctx = Context::new(RecordingBackend::new(), 640, 480).unwrap();
        let scene = initialize(&mut ctx, &presets::rotating_triangle(), FailurePolicy::Strict).unwrap();
        let mut render_loop = RenderLoop::new(scene);
        for i in 0..10 {
            render_loop.frame(&mut ctx, i as f64 * 16.0);
        }

        let links = ctx
            .backend()
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::LinkProgram { .. }))
            .count();
        assert_eq!(links, 1);
        assert_eq!(ctx.backend().draws().count(), 10);
    }

    #[test]
    fn stopped_loop_records_nothing() {
        let (mut ctx, mut render_loop) = start(presets::static_triangle());
        let handle = render_loop.stop_handle();

        render_loop.frame(&mut ctx, 0.0);
        handle.stop();
        ctx.backend_mut().take_commands();

        assert_eq!(render_loop.frame(&mut ctx, 16.0), FrameOutcome::Stopped);
        assert!(ctx.backend().commands().is_empty());
        assert_eq!(render_loop.frames(), 1);
    }

    #[test]
    fn draw_errors_do_not_stop_the_loop() {
        let mut desc = presets::static_triangle();
        desc.attributes[0].name = "coordinatez".to_string();
        let (mut ctx, mut render_loop) = start(desc);
        assert!(!render_loop.scene().diagnostics().is_empty());

        for ts in [0.0, 16.0, 33.0] {
            assert_eq!(render_loop.frame(&mut ctx, ts), FrameOutcome::Continue);
        }
        assert_eq!(clears(ctx.backend().commands()).len(), 3);
        assert_eq!(ctx.backend().draws().count(), 0);
    }
}
