// Playback and selection defaults

/// Interval between playback ticks when none is configured
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Fastest allowed cadence; a zero interval would spin the timer
pub const MIN_INTERVAL_MS: u64 = 1;

/// Slowest allowed cadence
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Records kept by a top-N selection when no count is given
pub const DEFAULT_TOP_N: usize = 10;

/// Keep an interval within [`MIN_INTERVAL_MS`, `MAX_INTERVAL_MS`]
pub fn clamp_interval_ms(ms: u64) -> u64 {
    ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
}

/// Settings a [`crate::playback::PlaybackController`] starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub interval_ms: u64,
}

impl PlaybackConfig {
    pub fn with_interval_ms(interval_ms: u64) -> Self {
        PlaybackConfig {
            interval_ms: clamp_interval_ms(interval_ms),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_are_clamped() {
        assert_eq!(clamp_interval_ms(0), MIN_INTERVAL_MS);
        assert_eq!(clamp_interval_ms(250), 250);
        assert_eq!(clamp_interval_ms(u64::MAX), MAX_INTERVAL_MS);
        assert_eq!(PlaybackConfig::with_interval_ms(0).interval_ms, 1);
        assert_eq!(PlaybackConfig::default().interval_ms, 1000);
    }
}
