use std::time::Instant;

use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
pub trait App {
    /// Called for every window event, before the runtime handles it.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per redraw per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called each time the event loop wakes up, before redraws are
    /// dispatched. Wall-clock timers are polled here.
    fn on_wake(&mut self, now: Instant) -> AppControl {
        let _ = now;
        AppControl::Continue
    }

    /// Earliest instant the app needs `on_wake`, if any.
    fn next_wake(&self) -> Option<Instant> {
        None
    }

    /// Called once when the event loop is shutting down.
    fn on_exit(&mut self) {}
}
