//! Per-control request sequencing
//!
//! Every load gets a ticket. A completion may only touch its control if its ticket is
//! still the newest one issued for that control. Controls are told apart by identity,
//! not by field id, so forms sharing a loader never supersede each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::form::SelectControl;

/// Identity of one control instance.
///
/// Derived from the address of the shared control. A load holds its control until it
/// settles, so the address cannot be reused while its ticket is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlKey(usize);

impl ControlKey {
    pub fn of(control: &Arc<dyn SelectControl>) -> Self {
        Self(Arc::as_ptr(control).cast::<()>().addr())
    }
}

/// Identifies one load of one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: ControlKey,
    seq: u64,
}

impl Ticket {
    pub fn key(&self) -> ControlKey {
        self.key
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// How a completing load relates to the newest load of its control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The ticket was the newest; the control has no load in flight anymore.
    Newest,
    /// A newer load exists. `newer_loading_id` is its indicator id while it is still in
    /// flight, `None` once it has settled too.
    Superseded { newer_loading_id: Option<String> },
}

#[derive(Debug)]
struct Latest {
    seq: u64,
    loading_id: String,
}

/// Issues tickets and answers "is this still the newest load for its control".
#[derive(Debug, Default)]
pub struct RequestSequencer {
    next: AtomicU64,
    latest: Mutex<HashMap<ControlKey, Latest>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn latest(&self) -> MutexGuard<'_, HashMap<ControlKey, Latest>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a load for `key`; supersedes every earlier ticket for it.
    pub fn issue(&self, key: ControlKey, loading_id: &str) -> Ticket {
        let seq = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        self.latest().insert(
            key,
            Latest {
                seq,
                loading_id: loading_id.to_string(),
            },
        );
        Ticket { key, seq }
    }

    /// Whether `ticket` is the newest load for its control still outstanding.
    pub fn is_latest(&self, ticket: &Ticket) -> bool {
        self.latest()
            .get(&ticket.key)
            .is_some_and(|l| l.seq == ticket.seq)
    }

    /// Retire `ticket` and run `then` with its settlement.
    ///
    /// No ticket can be issued while `then` runs, so whatever it does to the control and
    /// its indicator cannot interleave with the start of a newer load.
    pub fn settle<R>(&self, ticket: &Ticket, then: impl FnOnce(Settlement) -> R) -> R {
        let mut latest = self.latest();
        let newest = latest
            .get(&ticket.key)
            .is_some_and(|l| l.seq == ticket.seq);
        let settlement = if newest {
            latest.remove(&ticket.key);
            Settlement::Newest
        } else {
            Settlement::Superseded {
                newer_loading_id: latest.get(&ticket.key).map(|l| l.loading_id.clone()),
            }
        };
        then(settlement)
    }

    /// Number of controls with a load in flight.
    pub fn outstanding(&self) -> usize {
        self.latest().len()
    }
}
