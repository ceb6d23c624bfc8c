//! Ad break pacing and rotation
//!
//! Paces ad breaks so that each configured ad plays `plays_per_hour`
//! times per hour: with N ads at rate R, a break fires every
//! 3,600,000 / (N * R) milliseconds. Ads rotate round-robin in
//! configuration order, independent of main playlist progress.

use std::time::Duration;

use tubeloop_common::{Error, Result};

/// Milliseconds in one hour, the basis of the pacing formula
const HOUR_MS: f64 = 3_600_000.0;

/// Compute the delay between consecutive ad breaks
///
/// Callers reach this through `AdScheduler::new`, which has already
/// rejected an empty ad set and a non-positive rate.
fn tick_interval(ad_count: usize, plays_per_hour: f64) -> Duration {
    Duration::from_secs_f64(HOUR_MS / (ad_count as f64 * plays_per_hour) / 1000.0)
}

/// Fraction of the current ad interval that has elapsed, clamped to [0, 1]
pub fn interval_progress(elapsed: Duration, interval: Duration) -> f64 {
    if interval.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / interval.as_secs_f64()).clamp(0.0, 1.0)
}

/// Round-robin rotation over the configured ad videos
///
/// Selection returns the ad at the rotation position, then advances the
/// position. The position only moves when an ad is selected, so skipped
/// ticks (session not playing) do not skip ads.
#[derive(Debug, Clone)]
pub struct AdScheduler {
    /// Ad video ids, in configuration order
    video_ids: Vec<String>,

    /// Index of the ad the next break will play
    next_index: usize,

    /// Delay between ad breaks
    interval: Duration,
}

impl AdScheduler {
    /// Create a scheduler from the configured ads and pacing rate
    ///
    /// Fails when no ads are configured or the rate is not positive;
    /// both make the pacing formula meaningless.
    pub fn new(video_ids: Vec<String>, plays_per_hour: f64) -> Result<Self> {
        if video_ids.is_empty() {
            return Err(Error::Config(
                "at least one ad video id is required".to_string(),
            ));
        }
        if plays_per_hour <= 0.0 {
            return Err(Error::Config(format!(
                "ads.plays_per_hour must be positive, got {}",
                plays_per_hour
            )));
        }

        let interval = tick_interval(video_ids.len(), plays_per_hour);
        Ok(Self {
            video_ids,
            next_index: 0,
            interval,
        })
    }

    /// Delay between ad breaks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Select the ad for the next break and advance the rotation
    pub fn next_ad_video(&mut self) -> String {
        let video_id = self.video_ids[self.next_index].clone();
        self.next_index = (self.next_index + 1) % self.video_ids.len();
        video_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ads(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_interval_two_ads_once_per_hour() {
        // Two ads at one play per hour each: a break every 30 minutes.
        let interval = tick_interval(2, 1.0);
        assert_eq!(interval, Duration::from_millis(1_800_000));
    }

    #[test]
    fn test_interval_scales_with_count_and_rate() {
        assert_eq!(tick_interval(4, 30.0), Duration::from_millis(30_000));
        assert_eq!(tick_interval(1, 60.0), Duration::from_millis(60_000));
        assert_eq!(tick_interval(3, 20.0), Duration::from_millis(60_000));
    }

    #[test]
    fn test_scheduler_exposes_interval() {
        let scheduler = AdScheduler::new(ads(&["a1", "a2"]), 1.0).unwrap();
        assert_eq!(scheduler.interval(), Duration::from_millis(1_800_000));
    }

    #[test]
    fn test_round_robin_selection() {
        let mut scheduler = AdScheduler::new(ads(&["a1", "a2", "a3"]), 60.0).unwrap();

        assert_eq!(scheduler.next_ad_video(), "a1");
        assert_eq!(scheduler.next_ad_video(), "a2");
        assert_eq!(scheduler.next_ad_video(), "a3");
        assert_eq!(scheduler.next_ad_video(), "a1");
        assert_eq!(scheduler.next_ad_video(), "a2");
    }

    #[test]
    fn test_rotation_is_fair_over_many_breaks() {
        let mut scheduler = AdScheduler::new(ads(&["a1", "a2", "a3"]), 60.0).unwrap();

        let mut counts = std::collections::HashMap::new();
        for _ in 0..30 {
            *counts.entry(scheduler.next_ad_video()).or_insert(0u32) += 1;
        }

        assert_eq!(counts["a1"], 10);
        assert_eq!(counts["a2"], 10);
        assert_eq!(counts["a3"], 10);
    }

    #[test]
    fn test_empty_ad_set_rejected() {
        let err = AdScheduler::new(vec![], 60.0).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        assert!(AdScheduler::new(ads(&["a1"]), 0.0).is_err());
        assert!(AdScheduler::new(ads(&["a1"]), -2.5).is_err());
    }

    #[test]
    fn test_interval_progress_clamped() {
        let interval = Duration::from_millis(60_000);
        assert_eq!(interval_progress(Duration::ZERO, interval), 0.0);
        assert_eq!(
            interval_progress(Duration::from_millis(30_000), interval),
            0.5
        );
        assert_eq!(
            interval_progress(Duration::from_millis(90_000), interval),
            1.0
        );
        assert_eq!(interval_progress(Duration::from_millis(10), Duration::ZERO), 1.0);
    }
}
