//! services/client/src/app/slot.rs
//!
//! A reactive holder for one screen's fetched resource. Every fetch is tagged
//! with the link that triggered it; a response whose tag is no longer current
//! is discarded, so a slow earlier response never overwrites a newer one.

use moviereview_core::domain::Link;
use moviereview_core::ports::{LinkResolver, PortResult, ResolveError};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::debug;

/// What the slot currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Idle,
    /// The link gating this slot is not advertised.
    Unavailable,
    Loading,
    Loaded(T),
    Failed(ResolveError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotState<T> {
    generation: u64,
    href: Option<String>,
    phase: Phase<T>,
}

impl<T> SlotState<T> {
    /// The href of the fetch that currently owns the slot.
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }
}

/// Identifies one fetch; only the most recently issued ticket may complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    href: String,
}

pub struct ResourceSlot<T> {
    state: watch::Sender<SlotState<T>>,
}

impl<T> Default for ResourceSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceSlot<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SlotState {
            generation: 0,
            href: None,
            phase: Phase::Idle,
        });
        Self { state }
    }

    /// Marks the slot as loading for `link` and supersedes any in-flight fetch.
    pub fn begin(&self, link: &Link) -> Ticket {
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.generation += 1;
            state.href = Some(link.href.clone());
            state.phase = Phase::Loading;
            generation = state.generation;
        });
        Ticket {
            generation,
            href: link.href.clone(),
        }
    }

    /// Marks the slot as unavailable and supersedes any in-flight fetch.
    pub fn mark_unavailable(&self) {
        self.state.send_modify(|state| {
            state.generation += 1;
            state.href = None;
            state.phase = Phase::Unavailable;
        });
    }

    /// Applies `outcome` if `ticket` still owns the slot; returns whether it did.
    pub fn complete(&self, ticket: Ticket, outcome: PortResult<T>) -> bool {
        let applied = self.state.send_if_modified(|state| {
            let current = state.generation == ticket.generation
                && state.href.as_deref() == Some(ticket.href.as_str());
            if current {
                state.phase = match outcome {
                    Ok(value) => Phase::Loaded(value),
                    Err(e) => Phase::Failed(e),
                };
            }
            current
        });
        if !applied {
            debug!("Discarded stale response for {}", ticket.href);
        }
        applied
    }

    pub fn subscribe(&self) -> watch::Receiver<SlotState<T>> {
        self.state.subscribe()
    }
}

impl<T: Clone> ResourceSlot<T> {
    pub fn snapshot(&self) -> SlotState<T> {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> Phase<T> {
        self.state.borrow().phase.clone()
    }
}

impl<T: DeserializeOwned> ResourceSlot<T> {
    /// Fetches `link` into the slot; `None` renders the unavailable branch.
    /// Returns whether this fetch's outcome was applied.
    pub async fn load(&self, resolver: &dyn LinkResolver, link: Option<&Link>) -> bool {
        let Some(link) = link else {
            self.mark_unavailable();
            return false;
        };
        let ticket = self.begin(link);
        let outcome = match resolver.fetch_resource(link, None).await {
            Ok(resolved) => resolved.decode::<T>(),
            Err(e) => Err(e),
        };
        self.complete(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let slot: ResourceSlot<String> = ResourceSlot::new();
        assert_eq!(slot.phase(), Phase::Idle);
        assert_eq!(slot.snapshot().href(), None);
    }

    #[test]
    fn test_latest_ticket_wins_even_when_completed_first() {
        let slot: ResourceSlot<String> = ResourceSlot::new();

        let a = slot.begin(&Link::get("/movies/1"));
        let b = slot.begin(&Link::get("/movies/2"));

        assert!(slot.complete(b, Ok("movie two".into())));
        assert!(!slot.complete(a, Ok("movie one".into())));

        let state = slot.snapshot();
        assert_eq!(state.href(), Some("/movies/2"));
        assert_eq!(state.phase(), &Phase::Loaded("movie two".to_string()));
    }

    #[test]
    fn test_refetching_the_same_link_discards_the_older_ticket() {
        let slot: ResourceSlot<u32> = ResourceSlot::new();
        let link = Link::get("/movies/1");

        let first = slot.begin(&link);
        let second = slot.begin(&link);

        assert!(!slot.complete(first, Ok(1)));
        assert_eq!(slot.phase(), Phase::Loading);
        assert!(slot.complete(second, Ok(2)));
        assert_eq!(slot.phase(), Phase::Loaded(2));
    }

    #[test]
    fn test_unavailable_supersedes_in_flight_fetch() {
        let slot: ResourceSlot<u32> = ResourceSlot::new();
        let ticket = slot.begin(&Link::get("/movies"));

        slot.mark_unavailable();

        assert!(!slot.complete(ticket, Ok(7)));
        assert_eq!(slot.phase(), Phase::Unavailable);
    }

    #[test]
    fn test_failure_is_recorded() {
        let slot: ResourceSlot<u32> = ResourceSlot::new();
        let ticket = slot.begin(&Link::get("/movies"));
        let err = ResolveError::RequestFailed { status: 500, message: Some("boom".into()) };

        assert!(slot.complete(ticket, Err(err.clone())));
        assert_eq!(slot.phase(), Phase::Failed(err));
    }
}
