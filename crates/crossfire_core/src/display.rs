//! Display helpers for the editor
//!
//! Pure UI-tick math; nothing here is called from the audio thread. The
//! crossover line is drawn on a log-frequency axis and each band's
//! intensity is shown as a quarter-circle radius.

/// Lowest frequency on the display axis (Hz)
pub const DISPLAY_MIN_HZ: f32 = 20.0;
/// Highest frequency on the display axis (Hz)
pub const DISPLAY_MAX_HZ: f32 = 20000.0;

/// Quarter-circle radius at intensity 0
pub const MIN_RADIUS: f32 = 60.0;
/// Quarter-circle radius at intensity 1
pub const MAX_RADIUS: f32 = 170.0;

/// Map a frequency onto 0-1 along a log axis (20 Hz = 0, 20 kHz = 1)
pub fn frequency_to_position(frequency: f32) -> f32 {
    let frequency = frequency.clamp(DISPLAY_MIN_HZ, DISPLAY_MAX_HZ);
    (frequency / DISPLAY_MIN_HZ).ln() / (DISPLAY_MAX_HZ / DISPLAY_MIN_HZ).ln()
}

pub fn position_to_frequency(position: f32) -> f32 {
    let position = position.clamp(0.0, 1.0);
    DISPLAY_MIN_HZ * (DISPLAY_MAX_HZ / DISPLAY_MIN_HZ).powf(position)
}

pub fn intensity_to_radius(intensity: f32) -> f32 {
    MIN_RADIUS + intensity.clamp(0.0, 1.0) * (MAX_RADIUS - MIN_RADIUS)
}

pub fn radius_to_intensity(radius: f32) -> f32 {
    ((radius - MIN_RADIUS) / (MAX_RADIUS - MIN_RADIUS)).clamp(0.0, 1.0)
}

/// Eases a displayed value toward its target once per UI tick
///
/// Host automation moves the crossover in steps; the line on screen
/// glides instead of jumping.
#[derive(Debug, Clone, Copy)]
pub struct DisplayFollower {
    current: f32,
    target: f32,
    /// Fraction of the remaining distance covered per tick (0-1]
    rate: f32,
}

impl DisplayFollower {
    pub fn new(initial: f32, rate: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            rate: rate.clamp(f32::EPSILON, 1.0),
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Advance one tick and return the value to draw
    pub fn tick(&mut self) -> f32 {
        self.current += (self.target - self.current) * self.rate;
        if (self.target - self.current).abs() < 1e-3 {
            self.current = self.target;
        }
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }
}
