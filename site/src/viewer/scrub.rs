//! Scroll offset to clip time.

/// Length of one frame at 24 fps, in seconds.
pub const ONE_FRAME_SECS: f32 = 1.0 / 24.0;

/// Scroll distance (CSS px) over which the clip rewinds completely.
pub const DEFAULT_MAX_SCROLL: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubConfig {
    pub max_scroll: f32,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self { max_scroll: DEFAULT_MAX_SCROLL }
    }
}

impl ScrubConfig {
    /// Clip time for a scroll offset under this config.
    #[must_use]
    pub fn time_at(&self, scroll_y: f32, clip_duration: f32) -> f32 {
        scrub_time(scroll_y, self.max_scroll, clip_duration)
    }
}

/// `1 - (1 - t)^2`: fast start, gentle finish.
#[must_use]
pub fn ease_out_quad(t: f32) -> f32 {
    let inv = 1.0 - t;
    1.0 - inv * inv
}

/// Fraction of the scroll range covered, clamped to `0..=1`.
///
/// Negative and NaN offsets count as 0. A non-positive range is fully
/// scrolled as soon as the page moves at all.
#[must_use]
pub fn progress(scroll_y: f32, max_scroll: f32) -> f32 {
    let y = if scroll_y.is_nan() { 0.0 } else { scroll_y.max(0.0) };
    if max_scroll.is_nan() || max_scroll <= 0.0 {
        return if y > 0.0 { 1.0 } else { 0.0 };
    }
    (y / max_scroll).clamp(0.0, 1.0)
}

/// Playback time for a scroll offset.
///
/// `scrub_time(0, ..) == clip_duration - ONE_FRAME_SECS` and
/// `scrub_time(y >= max_scroll, ..) == 0`, non-increasing in between. A clip
/// shorter than one frame always sits at 0.
#[must_use]
pub fn scrub_time(scroll_y: f32, max_scroll: f32, clip_duration: f32) -> f32 {
    let usable = (clip_duration - ONE_FRAME_SECS).max(0.0);
    if usable.is_nan() {
        return 0.0;
    }
    let eased = ease_out_quad(progress(scroll_y, max_scroll));
    (1.0 - eased) * usable
}

#[cfg(test)]
#[path = "scrub_test.rs"]
mod tests;
