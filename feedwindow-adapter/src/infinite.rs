use crate::generation::Generation;

/// Connectivity as reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetworkStatus {
    #[default]
    Online,
    Offline,
    Reconnecting,
}

impl NetworkStatus {
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Snapshot of the caller's data provider at trigger time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProviderState {
    pub has_more: bool,
    pub is_loading: bool,
}

impl ProviderState {
    pub const IDLE: Self = Self {
        has_more: true,
        is_loading: false,
    };
}

/// Why a sentinel intersection did not start a load.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum LoadSkipped {
    #[error("sentinel visibility {ratio} is below the threshold {threshold}")]
    BelowThreshold { ratio: f32, threshold: f32 },
    #[error("the data provider has no more items")]
    Exhausted,
    #[error("network unavailable: {0:?}")]
    NetworkUnavailable(NetworkStatus),
    #[error("a load-more call is already in flight")]
    InFlight,
    #[error("the data provider is already loading")]
    ProviderBusy,
}

/// Proof that a load-more call was started. Hand it back to
/// [`InfiniteScrollCoordinator::finish`] when the call settles.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a load ticket must be handed back to `finish` when the load settles"]
pub struct LoadTicket {
    generation: Generation,
    seq: u64,
    issued_at_ms: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn issued_at_ms(&self) -> u64 {
        self.issued_at_ms
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Latch {
    seq: u64,
    fired_at_ms: u64,
}

/// Single-flight gate in front of the caller's `loadMore`.
///
/// A trigger sets the latch and hands out a [`LoadTicket`]. The latch is released when that
/// ticket is finished or once the cool-down has elapsed, whichever comes first.
#[derive(Clone, Debug)]
pub struct InfiniteScrollCoordinator {
    threshold: f32,
    cooldown_ms: u64,
    generation: Generation,
    latch: Option<Latch>,
    next_seq: u64,
}

impl InfiniteScrollCoordinator {
    pub fn new(threshold: f32, cooldown_ms: u64, generation: Generation) -> Self {
        Self {
            threshold,
            cooldown_ms,
            generation,
            latch: None,
            next_seq: 0,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    /// Whether a load is in flight and the cool-down has not yet released it.
    pub fn is_latched(&self, now_ms: u64) -> bool {
        self.latch
            .is_some_and(|l| now_ms.saturating_sub(l.fired_at_ms) < self.cooldown_ms)
    }

    /// Reacts to the sentinel's visibility ratio.
    ///
    /// Returns a ticket when the caller should start `loadMore` now.
    pub fn on_intersection(
        &mut self,
        ratio: f32,
        provider: ProviderState,
        network: NetworkStatus,
        now_ms: u64,
    ) -> Result<LoadTicket, LoadSkipped> {
        let result = self.try_fire(ratio, provider, network, now_ms);
        match &result {
            Ok(_ticket) => {
                adebug!(
                    generation = _ticket.generation.get(),
                    seq = _ticket.seq,
                    now_ms,
                    "load more fired"
                );
            }
            Err(_reason) => {
                atrace!(reason = %_reason, now_ms, "load more skipped");
            }
        }
        result
    }

    fn try_fire(
        &mut self,
        ratio: f32,
        provider: ProviderState,
        network: NetworkStatus,
        now_ms: u64,
    ) -> Result<LoadTicket, LoadSkipped> {
        if ratio.is_nan() || ratio < self.threshold {
            return Err(LoadSkipped::BelowThreshold {
                ratio,
                threshold: self.threshold,
            });
        }
        if !provider.has_more {
            return Err(LoadSkipped::Exhausted);
        }
        if !network.is_online() {
            return Err(LoadSkipped::NetworkUnavailable(network));
        }
        if self.is_latched(now_ms) {
            return Err(LoadSkipped::InFlight);
        }
        if provider.is_loading {
            return Err(LoadSkipped::ProviderBusy);
        }

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.latch = Some(Latch {
            seq,
            fired_at_ms: now_ms,
        });
        Ok(LoadTicket {
            generation: self.generation,
            seq,
            issued_at_ms: now_ms,
        })
    }

    /// Settles a load started with `ticket` and passes its result through unmodified.
    ///
    /// The latch is released only when the ticket is the current one; tickets from an older
    /// generation or a superseded trigger are ignored.
    pub fn finish<E>(&mut self, ticket: LoadTicket, result: Result<(), E>) -> Result<(), E> {
        let current = ticket.generation == self.generation
            && self.latch.is_some_and(|l| l.seq == ticket.seq);
        if current {
            self.latch = None;
        }
        adebug!(
            generation = ticket.generation.get(),
            seq = ticket.seq,
            current,
            ok = result.is_ok(),
            "load more finished"
        );
        result
    }

    /// Drops any latch and moves to `generation`. Outstanding tickets become stale.
    pub fn reset(&mut self, generation: Generation) {
        self.latch = None;
        self.generation = generation;
    }
}

/// Fraction of the sentinel row that intersects the viewport extended by `root_margin`.
///
/// The sentinel sits right after the last item, i.e. at `[items_end, items_end + sentinel_size)`.
pub fn sentinel_visibility(
    items_end: u64,
    scroll_offset: u64,
    viewport_size: u32,
    sentinel_size: u32,
    root_margin: u32,
) -> f32 {
    let size = u64::from(sentinel_size.max(1));
    let top = items_end;
    let bottom = items_end.saturating_add(size);
    let view_top = scroll_offset;
    let view_bottom = scroll_offset
        .saturating_add(u64::from(viewport_size))
        .saturating_add(u64::from(root_margin));

    let overlap = bottom.min(view_bottom).saturating_sub(top.max(view_top));
    (overlap as f64 / size as f64) as f32
}
