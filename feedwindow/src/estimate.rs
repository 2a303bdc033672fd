//! Initial height guesses for items that have not been measured yet.

/// Height every estimate starts from.
pub const BASE_HEIGHT: u32 = 180;
/// Added when the text is longer than [`LONG_TEXT_CHARS`].
pub const LONG_TEXT_EXTRA: u32 = 60;
/// Added on top of [`LONG_TEXT_EXTRA`] when the text is longer than [`VERY_LONG_TEXT_CHARS`].
pub const VERY_LONG_TEXT_EXTRA: u32 = 40;
/// Added when the item carries an image.
pub const IMAGE_EXTRA: u32 = 300;
/// Added when the text contains a recognized video embed.
pub const VIDEO_EXTRA: u32 = 350;
/// Added on narrow (mobile) viewports, where text wraps more.
pub const NARROW_VIEWPORT_EXTRA: u32 = 50;

/// Text longer than this many chars counts as long.
pub const LONG_TEXT_CHARS: usize = 280;
/// Text longer than this many chars counts as very long.
pub const VERY_LONG_TEXT_CHARS: usize = 500;

const VIDEO_MARKERS: &[&str] = &[
    "youtube.com/watch",
    "youtube.com/shorts/",
    "youtu.be/",
    "vimeo.com/",
    ".mp4",
    ".webm",
    ".mov",
];

/// The content facts an estimate is based on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentSignals {
    /// Text length in chars.
    pub text_len: usize,
    pub has_image: bool,
    pub has_video: bool,
}

impl ContentSignals {
    pub fn text(text_len: usize) -> Self {
        Self {
            text_len,
            ..Self::default()
        }
    }

    pub fn with_image(mut self, has_image: bool) -> Self {
        self.has_image = has_image;
        self
    }

    pub fn with_video(mut self, has_video: bool) -> Self {
        self.has_video = has_video;
        self
    }

    /// Derives signals from raw post text.
    ///
    /// Video embeds are recognized by URL markers (YouTube, Vimeo, direct video files), matched
    /// ASCII case-insensitively.
    pub fn scan(text: &str, has_image: bool) -> Self {
        Self {
            text_len: text.chars().count(),
            has_image,
            has_video: contains_video_marker(text),
        }
    }
}

fn contains_video_marker(text: &str) -> bool {
    let haystack = text.as_bytes();
    VIDEO_MARKERS.iter().any(|marker| {
        let needle = marker.as_bytes();
        haystack
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle))
    })
}

/// Viewport width class, sampled once at mount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewportClass {
    Narrow,
    #[default]
    Wide,
}

/// Deterministic height estimator. Never looks at rendered output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightEstimator {
    pub viewport_class: ViewportClass,
}

impl Default for HeightEstimator {
    fn default() -> Self {
        Self::new(ViewportClass::Wide)
    }
}

impl HeightEstimator {
    pub const fn new(viewport_class: ViewportClass) -> Self {
        Self { viewport_class }
    }

    pub fn estimate(&self, signals: &ContentSignals) -> u32 {
        let mut h = self.min_estimate();
        if signals.text_len > LONG_TEXT_CHARS {
            h += LONG_TEXT_EXTRA;
        }
        if signals.text_len > VERY_LONG_TEXT_CHARS {
            h += VERY_LONG_TEXT_EXTRA;
        }
        if signals.has_image {
            h += IMAGE_EXTRA;
        }
        if signals.has_video {
            h += VIDEO_EXTRA;
        }
        h
    }

    /// The smallest value [`Self::estimate`] can return for this viewport class.
    pub fn min_estimate(&self) -> u32 {
        match self.viewport_class {
            ViewportClass::Narrow => BASE_HEIGHT + NARROW_VIEWPORT_EXTRA,
            ViewportClass::Wide => BASE_HEIGHT,
        }
    }
}
