//! Anchored position model
//!
//! While playing, `position = (now - anchor) * rate`. While paused the
//! position is the stored offset. Every read is clamped to `[0, duration]`.

/// Pure timing state of one loaded buffer
#[derive(Debug, Clone, PartialEq)]
pub struct TransportTiming {
    anchor: f64,
    paused_offset: f64,
    rate: f64,
    playing: bool,
    duration: f64,
}

impl Default for TransportTiming {
    fn default() -> Self {
        Self {
            anchor: 0.0,
            paused_offset: 0.0,
            rate: 1.0,
            playing: false,
            duration: 0.0,
        }
    }
}

impl TransportTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position in seconds at time `now`
    pub fn position(&self, now: f64) -> f64 {
        let raw = if self.playing {
            (now - self.anchor) * self.rate
        } else {
            self.paused_offset
        };
        self.clamp(raw)
    }

    /// Offset playback would resume from
    pub fn paused_offset(&self) -> f64 {
        self.paused_offset
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Begin advancing from the paused offset
    pub fn start(&mut self, now: f64) {
        self.anchor = now - self.paused_offset / self.rate;
        self.playing = true;
    }

    /// Capture the current position and stop advancing
    pub fn freeze(&mut self, now: f64) -> f64 {
        self.paused_offset = self.position(now);
        self.playing = false;
        self.paused_offset
    }

    /// Change rate without a position jump
    ///
    /// Non-positive or non-finite rates are ignored.
    pub fn set_rate(&mut self, now: f64, rate: f64) -> bool {
        if !(rate.is_finite() && rate > 0.0) {
            return false;
        }
        if self.playing {
            let position = self.position(now);
            self.anchor = now - position / rate;
        }
        self.rate = rate;
        true
    }

    /// Move the paused offset, clamped to the buffer
    pub fn seek(&mut self, position: f64) -> f64 {
        self.paused_offset = self.clamp(position);
        self.paused_offset
    }

    /// Back to the start, not playing
    pub fn reset(&mut self) {
        self.paused_offset = 0.0;
        self.playing = false;
    }

    /// Adopt a freshly loaded buffer's duration, from the start
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        self.reset();
    }

    fn clamp(&self, position: f64) -> f64 {
        if position.is_nan() {
            return 0.0;
        }
        position.clamp(0.0, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn loaded(duration: f64) -> TransportTiming {
        let mut timing = TransportTiming::new();
        timing.set_duration(duration);
        timing
    }

    #[test]
    fn position_advances_with_rate() {
        let mut timing = loaded(200.0);
        timing.set_rate(0.0, 1.35);
        timing.start(10.0);

        assert!((timing.position(12.0) - 2.7).abs() < 1e-9);
    }

    #[test]
    fn freeze_then_start_resumes_from_offset() {
        let mut timing = loaded(200.0);
        timing.start(0.0);
        assert_eq!(timing.freeze(30.0), 30.0);
        assert_eq!(timing.position(100.0), 30.0);

        timing.start(100.0);
        assert!((timing.position(105.0) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn rate_change_keeps_position_continuous() {
        let mut timing = loaded(200.0);
        timing.start(0.0);

        // 10s into playback at 33 RPM, switch to 45
        assert!(timing.set_rate(10.0, 1.35));
        assert!((timing.position(10.0) - 10.0).abs() < 1e-9);
        assert!((timing.position(12.0) - 12.7).abs() < 1e-9);
    }

    #[test]
    fn invalid_rates_are_ignored() {
        let mut timing = loaded(200.0);
        assert!(!timing.set_rate(0.0, 0.0));
        assert!(!timing.set_rate(0.0, -1.0));
        assert!(!timing.set_rate(0.0, f64::NAN));
        assert_eq!(timing.rate(), 1.0);
    }

    #[test]
    fn position_never_exceeds_duration() {
        let mut timing = loaded(5.0);
        timing.start(0.0);
        assert_eq!(timing.position(60.0), 5.0);
    }

    #[test]
    fn nothing_loaded_reads_zero() {
        let mut timing = TransportTiming::new();
        timing.start(0.0);
        assert_eq!(timing.position(42.0), 0.0);
    }

    proptest! {
        #[test]
        fn position_stays_within_bounds(
            duration in 0.0f64..600.0,
            start in 0.0f64..1000.0,
            elapsed in 0.0f64..1000.0,
            rate in 0.1f64..4.0,
            seek in -100.0f64..1000.0,
        ) {
            let mut timing = loaded(duration);
            timing.seek(seek);
            timing.set_rate(start, rate);
            timing.start(start);

            let position = timing.position(start + elapsed);
            prop_assert!((0.0..=duration).contains(&position));
        }

        #[test]
        fn rate_change_is_continuous(
            elapsed in 0.0f64..100.0,
            first in 0.1f64..4.0,
            second in 0.1f64..4.0,
        ) {
            let mut timing = loaded(1_000.0);
            timing.set_rate(0.0, first);
            timing.start(0.0);

            let before = timing.position(elapsed);
            timing.set_rate(elapsed, second);
            let after = timing.position(elapsed);
            prop_assert!((before - after).abs() < 1e-6);
        }
    }
}
