/// Frame timing overlay model: an FPS panel and a frame-time panel
use std::fmt;

/// FPS is recomputed once per window
const FPS_WINDOW_MS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPanel {
    Fps,
    Ms,
}

impl fmt::Display for StatsPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsPanel::Fps => write!(f, "FPS"),
            StatsPanel::Ms => write!(f, "MS"),
        }
    }
}

/// Latest value plus the observed range for one panel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelReading {
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

impl PanelReading {
    fn record(slot: &mut Option<PanelReading>, value: f32) {
        *slot = Some(match *slot {
            None => PanelReading {
                value,
                min: value,
                max: value,
            },
            Some(reading) => PanelReading {
                value,
                min: reading.min.min(value),
                max: reading.max.max(value),
            },
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frames: u32,
    window_start_ms: Option<f64>,
    previous_ms: Option<f64>,
    fps: Option<PanelReading>,
    frame_ms: Option<PanelReading>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the end of a frame at timestamp `now_ms`
    pub fn update(&mut self, now_ms: f64) {
        let window_start = *self.window_start_ms.get_or_insert(now_ms);

        if let Some(previous) = self.previous_ms {
            PanelReading::record(&mut self.frame_ms, (now_ms - previous).max(0.0) as f32);
        }
        self.previous_ms = Some(now_ms);
        self.frames += 1;

        let elapsed = now_ms - window_start;
        if elapsed >= FPS_WINDOW_MS {
            let fps = (self.frames as f64 * 1000.0 / elapsed) as f32;
            PanelReading::record(&mut self.fps, fps);
            self.window_start_ms = Some(now_ms);
            self.frames = 0;
        }
    }

    pub fn reading(&self, panel: StatsPanel) -> Option<PanelReading> {
        match panel {
            StatsPanel::Fps => self.fps,
            StatsPanel::Ms => self.frame_ms,
        }
    }

    pub fn fps(&self) -> Option<f32> {
        self.fps.map(|reading| reading.value)
    }

    pub fn frame_time_ms(&self) -> Option<f32> {
        self.frame_ms.map(|reading| reading.value)
    }

    /// e.g. `20 FPS (19-21)`, or `-- FPS` before the first reading
    pub fn panel_text(&self, panel: StatsPanel) -> String {
        match self.reading(panel) {
            Some(reading) => format!(
                "{:.0} {} ({:.0}-{:.0})",
                reading.value, panel, reading.min, reading.max
            ),
            None => format!("-- {}", panel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_time_is_interval_between_updates() {
        let mut stats = FrameStats::new();
        stats.update(0.0);
        assert_eq!(stats.frame_time_ms(), None);
        stats.update(50.0);
        assert_eq!(stats.frame_time_ms(), Some(50.0));
        stats.update(70.0);
        let reading = stats.reading(StatsPanel::Ms).unwrap();
        assert_eq!(reading.value, 20.0);
        assert_eq!(reading.min, 20.0);
        assert_eq!(reading.max, 50.0);
    }

    #[test]
    fn test_fps_reported_once_per_second() {
        let mut stats = FrameStats::new();
        // 20 Hz for a little over a second
        for tick in 0..=21 {
            stats.update(tick as f64 * 50.0);
        }
        let fps = stats.fps().unwrap();
        assert!((fps - 21.0).abs() < 1e-3, "fps = {}", fps);
    }

    #[test]
    fn test_panel_text() {
        let mut stats = FrameStats::new();
        assert_eq!(stats.panel_text(StatsPanel::Fps), "-- FPS");
        stats.update(0.0);
        stats.update(50.0);
        assert_eq!(stats.panel_text(StatsPanel::Ms), "50 MS (50-50)");
    }
}
