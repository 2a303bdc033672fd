use feedwindow::{HeightEstimator, ViewportClass};

/// Viewports narrower than this are treated as mobile.
pub const NARROW_VIEWPORT_WIDTH: u32 = 768;
/// Devices reporting at most this many logical cores get the smallest overscan.
pub const LOW_END_MAX_CORES: u32 = 2;

pub const LOW_END_OVERSCAN: usize = 2;
pub const MOBILE_OVERSCAN: usize = 3;
pub const DESKTOP_OVERSCAN: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceTier {
    LowEnd,
    Mobile,
    Desktop,
}

/// What the host knows about the device at mount time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceProfile {
    pub viewport_width: u32,
    /// Logical cores; `0` when the host cannot tell.
    pub hardware_concurrency: u32,
    pub prefers_reduced_motion: bool,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            hardware_concurrency: 8,
            prefers_reduced_motion: false,
        }
    }
}

impl DeviceProfile {
    pub fn new(viewport_width: u32, hardware_concurrency: u32) -> Self {
        Self {
            viewport_width,
            hardware_concurrency,
            prefers_reduced_motion: false,
        }
    }

    pub fn with_reduced_motion(mut self, prefers_reduced_motion: bool) -> Self {
        self.prefers_reduced_motion = prefers_reduced_motion;
        self
    }

    pub fn tier(&self) -> DeviceTier {
        if self.hardware_concurrency != 0 && self.hardware_concurrency <= LOW_END_MAX_CORES {
            DeviceTier::LowEnd
        } else if self.viewport_width < NARROW_VIEWPORT_WIDTH {
            DeviceTier::Mobile
        } else {
            DeviceTier::Desktop
        }
    }

    pub fn viewport_class(&self) -> ViewportClass {
        if self.viewport_width < NARROW_VIEWPORT_WIDTH {
            ViewportClass::Narrow
        } else {
            ViewportClass::Wide
        }
    }

    pub fn overscan(&self) -> usize {
        match self.tier() {
            DeviceTier::LowEnd => LOW_END_OVERSCAN,
            DeviceTier::Mobile => MOBILE_OVERSCAN,
            DeviceTier::Desktop => DESKTOP_OVERSCAN,
        }
    }

    pub fn estimator(&self) -> HeightEstimator {
        HeightEstimator::new(self.viewport_class())
    }
}
