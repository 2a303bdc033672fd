//! Feed session utilities for the `feedwindow` crate.
//!
//! `feedwindow` computes which rows to mount. This crate adds the per-feed state an app needs
//! around it, still without binding to any UI framework:
//!
//! - [`InfiniteScrollCoordinator`]: single-flight, offline-aware gating of `loadMore`
//! - [`ScrollPositionManager`] and [`ScrollPositionStore`]: throttled capture, restore by
//!   [`ListKey`], scroll-to-top (animated or instant under reduced motion)
//! - Scroll anchoring so prepended posts do not move the reader
//! - [`FeedSession`]: owns all of the above for one mounted list and invalidates stale work with
//!   a [`Generation`] token when the list changes
//!
//! Time is always passed in as `now_ms`; the host drives [`FeedSession::tick`] once per frame.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod config;
mod device;
mod generation;
mod infinite;
mod key;
mod position;
mod session;
mod tween;


pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use config::FeedConfig;
pub use device::{
    DESKTOP_OVERSCAN, DeviceProfile, DeviceTier, LOW_END_MAX_CORES, LOW_END_OVERSCAN,
    MOBILE_OVERSCAN, NARROW_VIEWPORT_WIDTH,
};
pub use generation::Generation;
pub use infinite::{
    InfiniteScrollCoordinator, LoadSkipped, LoadTicket, NetworkStatus, ProviderState,
    sentinel_visibility,
};
pub use key::ListKey;
pub use position::{OffsetUpdate, ScrollPositionManager, ScrollPositionStore, ScrollState};
pub use session::{FeedSession, FrameUpdate, RowView};
pub use tween::{Easing, ScrollAnimation};
