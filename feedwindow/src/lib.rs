//! A headless virtualization engine for social feeds.
//!
//! The feed is unbounded and its items have unknown heights until rendered. This crate keeps
//! render cost independent of feed length:
//!
//! - [`HeightEstimator`] guesses a row height from content signals (text length, media).
//! - [`HeightCache`] remembers measured heights by item id; a measurement always wins.
//! - [`Virtualizer`] keeps cumulative offsets in a Fenwick tree and yields the bounded,
//!   overscanned set of rows to mount for a scroll offset and viewport size.
//! - [`VisibilityTracker`] turns the row set into debounced visible/preload id sets and only
//!   publishes when membership changes.
//!
//! It is UI-agnostic. The adapter provides viewport size, scroll offsets, the current time in
//! milliseconds and measured heights. For infinite scroll gating, position persistence and
//! per-list sessions, see the `feedwindow-adapter` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod cache;
mod estimate;
mod key;
mod options;
mod prefix;
mod types;
mod virtualizer;
mod visibility;

#[cfg(test)]
mod tests;

pub use cache::{HeightCache, MeasurementError, size_from_px};
pub use estimate::{
    BASE_HEIGHT, ContentSignals, HeightEstimator, IMAGE_EXTRA, LONG_TEXT_CHARS, LONG_TEXT_EXTRA,
    NARROW_VIEWPORT_EXTRA, VERY_LONG_TEXT_CHARS, VERY_LONG_TEXT_EXTRA, VIDEO_EXTRA,
    ViewportClass,
};
pub use key::KeySet;
pub use options::{
    AdjustOffsetOnResizeCallback, DEFAULT_OVERSCAN, OnChangeCallback, VirtualizerOptions,
};
pub use types::{Align, FeedItem, ScrollDirection, VirtualRange, VirtualRow};
pub use virtualizer::{MIN_ITEM_SIZE, Virtualizer};
pub use visibility::{OnVisibilityChange, TrackerOptions, VisibilitySnapshot, VisibilityTracker};

#[doc(hidden)]
pub use key::FeedKey;
