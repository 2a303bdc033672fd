/// Smooth scroll animation driven by the adapter's frame clock.
///
/// Used for scroll-to-top. The adapter writes [`ScrollAnimation::offset_at`] into the scroll
/// container on every frame until [`ScrollAnimation::finished`] reports `true`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnimation {
    pub origin: u64,
    pub target: u64,
    pub started_at_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl ScrollAnimation {
    pub fn new(origin: u64, target: u64, started_at_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            origin,
            target,
            started_at_ms,
            duration_ms: duration_ms.max(1),
            easing,
        }
    }

    /// Animation from `origin` back to the first post.
    pub fn to_top(origin: u64, started_at_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self::new(origin, 0, started_at_ms, duration_ms, easing)
    }

    /// Linear progress in `0.0..=1.0`.
    pub fn progress(&self, now_ms: u64) -> f64 {
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        (elapsed as f64 / self.duration_ms as f64).min(1.0)
    }

    pub fn finished(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_at_ms) >= self.duration_ms
    }

    /// Eased offset at `now_ms`; exactly `target` once finished.
    pub fn offset_at(&self, now_ms: u64) -> u64 {
        if self.finished(now_ms) {
            return self.target;
        }
        let eased = self.easing.apply(self.progress(now_ms));
        let origin = self.origin as f64;
        let span = self.target as f64 - origin;
        (origin + span * eased + 0.5).max(0.0) as u64
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    #[default]
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    /// Maps linear progress `t` in `0.0..=1.0` onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutCubic => 1.0 - cube(1.0 - t),
            Self::EaseInOutCubic if t < 0.5 => 4.0 * cube(t),
            Self::EaseInOutCubic => 1.0 - cube(2.0 - 2.0 * t) / 2.0,
        }
    }
}

fn cube(x: f64) -> f64 {
    x * x * x
}
