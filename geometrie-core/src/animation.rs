/// Animation loop.
///
/// Hosts call [`AnimationLoop::frame`] from whatever scheduling primitive
/// they have (a display-synced callback in the browser, a poll timeout in
/// the terminal) with a monotonic timestamp in milliseconds. The loop
/// decides whether a tick is due and how far the shapes turn.
use std::cell::Cell;
use std::rc::Rc;

use crate::error::Result;
use crate::scene::{Scene, SceneHandles};
use crate::viewport::{Renderer, Viewport};

/// Radians per reference tick
pub const ROTATION_SPEED: f32 = 0.015;

/// Duration of one reference tick
pub const REFERENCE_INTERVAL_MS: f64 = 50.0;

/// Longest gap integrated in one step, so a stalled tab does not lurch
pub const MAX_FRAME_DELTA_MS: f64 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    /// One fixed rotation step per elapsed interval
    FixedDelay { interval_ms: f64 },
    /// Tick on every frame, scaling the step by elapsed time
    DeltaTime,
}

impl Timing {
    pub fn fixed() -> Self {
        Timing::FixedDelay {
            interval_ms: REFERENCE_INTERVAL_MS,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing::DeltaTime
    }
}

/// Rotation directions per shape, as multiples of the step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub x: f32,
    pub y: f32,
}

pub const PRIMARY_SPIN: Spin = Spin { x: 1.0, y: -1.0 };
pub const SECONDARY_SPIN: Spin = Spin { x: 1.0, y: 1.0 };

/// Turn both shapes and their overlays by `step` radians
pub fn spin(scene: &mut Scene, handles: &SceneHandles, step: f32) {
    for (shape, direction) in [
        (handles.primary, PRIMARY_SPIN),
        (handles.secondary, SECONDARY_SPIN),
    ] {
        for id in shape.nodes() {
            if let Some(node) = scene.node_mut(id) {
                node.rotation.rotate(step * direction.x, step * direction.y, 0.0);
            }
        }
    }
}

/// Shared cancellation flag for a running loop
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug)]
pub struct AnimationLoop {
    timing: Timing,
    last_tick_ms: Option<f64>,
    ticks: u64,
    stop: StopHandle,
}

impl AnimationLoop {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            last_tick_ms: None,
            ticks: 0,
            stop: StopHandle::default(),
        }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.stop.is_stopped()
    }

    /// Milliseconds the host may sleep before the next tick could be due
    pub fn wait_hint_ms(&self, now_ms: f64) -> f64 {
        match (self.timing, self.last_tick_ms) {
            (Timing::FixedDelay { interval_ms }, Some(last)) => (last + interval_ms - now_ms).max(0.0),
            (Timing::FixedDelay { .. }, None) | (Timing::DeltaTime, _) => 0.0,
        }
    }

    /// Rotation step for a frame at `now_ms`, or `None` when no tick is due.
    ///
    /// The first call only starts the clock.
    pub fn advance(&mut self, now_ms: f64) -> Option<f32> {
        if self.stop.is_stopped() {
            return None;
        }

        let Some(last) = self.last_tick_ms else {
            self.last_tick_ms = Some(now_ms);
            return None;
        };

        let elapsed = now_ms - last;
        let step = match self.timing {
            Timing::FixedDelay { interval_ms } => {
                if elapsed < interval_ms {
                    return None;
                }
                ROTATION_SPEED
            }
            Timing::DeltaTime => {
                let dt = elapsed.clamp(0.0, MAX_FRAME_DELTA_MS);
                (ROTATION_SPEED as f64 * dt / REFERENCE_INTERVAL_MS) as f32
            }
        };

        self.last_tick_ms = Some(now_ms);
        self.ticks += 1;
        Some(step)
    }

    /// Run a tick on `viewport` if one is due. Returns `false` once stopped.
    pub fn frame<R: Renderer>(&mut self, viewport: &mut Viewport<R>, now_ms: f64) -> Result<bool> {
        if !self.is_running() {
            return Ok(false);
        }
        if let Some(step) = self.advance(now_ms) {
            viewport.tick(step, now_ms)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay_throttles() {
        let mut animation = AnimationLoop::new(Timing::fixed());
        assert_eq!(animation.advance(0.0), None);
        assert_eq!(animation.advance(16.0), None);
        assert_eq!(animation.advance(49.9), None);
        assert_eq!(animation.advance(50.0), Some(ROTATION_SPEED));
        // a late frame still turns by exactly one step
        assert_eq!(animation.advance(180.0), Some(ROTATION_SPEED));
        assert_eq!(animation.ticks(), 2);
    }

    #[test]
    fn test_delta_time_scales_with_elapsed() {
        let mut animation = AnimationLoop::new(Timing::DeltaTime);
        assert_eq!(animation.advance(1000.0), None);
        let step = animation.advance(1050.0).unwrap();
        assert!((step - ROTATION_SPEED).abs() < 1e-7);
        let half = animation.advance(1075.0).unwrap();
        assert!((half - ROTATION_SPEED / 2.0).abs() < 1e-7);
    }

    #[test]
    fn test_delta_time_clamps_stalls() {
        let mut animation = AnimationLoop::new(Timing::DeltaTime);
        animation.advance(0.0);
        let step = animation.advance(60_000.0).unwrap();
        assert!((step - ROTATION_SPEED * 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_stopped_loop_never_ticks() {
        let mut animation = AnimationLoop::new(Timing::fixed());
        let handle = animation.stop_handle();
        animation.advance(0.0);
        handle.stop();
        assert!(!animation.is_running());
        assert_eq!(animation.advance(1000.0), None);
        assert_eq!(animation.ticks(), 0);
    }

    #[test]
    fn test_wait_hint() {
        let mut animation = AnimationLoop::new(Timing::fixed());
        assert_eq!(animation.wait_hint_ms(0.0), 0.0);
        animation.advance(100.0);
        assert_eq!(animation.wait_hint_ms(120.0), 30.0);
        assert_eq!(animation.wait_hint_ms(200.0), 0.0);
    }
}
