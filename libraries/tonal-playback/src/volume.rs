//! Volume control with linear scaling
//!
//! Volume range is 0-100, mapped linearly onto a 0.0-1.0 multiplier.

/// Volume level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    /// Volume level (0-100)
    level: u8,
}

impl Volume {
    /// Default level for a new session
    pub const DEFAULT_LEVEL: u8 = 70;

    /// Create new volume, clamping to 100
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(100),
        }
    }

    /// Set volume level (0-100)
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
    }

    /// Get current volume level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Linear gain multiplier, exactly `level / 100`
    pub fn gain(&self) -> f32 {
        f32::from(self.level) / 100.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_range() {
        let mut vol = Volume::new(50);
        assert_eq!(vol.level(), 50);

        vol.set_level(150); // Should clamp to 100
        assert_eq!(vol.level(), 100);
    }

    #[test]
    fn silence_and_unity_at_extremes() {
        assert_eq!(Volume::new(0).gain(), 0.0);
        assert_eq!(Volume::new(100).gain(), 1.0);
    }

    #[test]
    fn default_is_seventy_percent() {
        let vol = Volume::default();
        assert_eq!(vol.level(), 70);
        assert!((vol.gain() - 0.7).abs() < 1e-6);
    }
}
