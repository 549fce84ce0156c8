//! Slide-in/slide-out animation of the sidebar.
//!
//! Timestamps are milliseconds from the page's monotonic clock
//! (`performance.now()` in the browser), supplied by the caller.

/// Duration of the show/hide slide
pub const SLIDE_DURATION_MS: f64 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideAnimation {
    pub direction: SlideDirection,
    started_at: f64,
    duration: f64,
}

impl SlideAnimation {
    pub fn new(direction: SlideDirection, now_ms: f64) -> Self {
        Self {
            direction,
            started_at: now_ms,
            duration: SLIDE_DURATION_MS,
        }
    }

    /// Start a slide from wherever `previous` currently is, so reversing
    /// mid-animation doesn't jump. The curve is symmetric, so mirrored linear
    /// progress lands on the same eased position.
    pub fn reverse_from(previous: &SlideAnimation, direction: SlideDirection, now_ms: f64) -> Self {
        let covered = if previous.direction == direction {
            previous.progress(now_ms)
        } else {
            1.0 - previous.progress(now_ms)
        };
        Self {
            direction,
            started_at: now_ms - covered * SLIDE_DURATION_MS,
            duration: SLIDE_DURATION_MS,
        }
    }

    /// Linear progress in [0, 1].
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_at) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// How much of the panel is on screen, eased: 0 = fully hidden,
    /// 1 = fully shown.
    pub fn shown_fraction(&self, now_ms: f64) -> f64 {
        let eased = ease_in_out(self.progress(now_ms));
        match self.direction {
            SlideDirection::In => eased,
            SlideDirection::Out => 1.0 - eased,
        }
    }
}

/// cubic-bezier(0.42, 0, 0.58, 1)
fn ease_in_out(t: f64) -> f64 {
    match bezier_easing::bezier_easing(0.42, 0.0, 0.58, 1.0) {
        Ok(ease) => ease(t as f32) as f64,
        Err(_) => t,
    }
}
