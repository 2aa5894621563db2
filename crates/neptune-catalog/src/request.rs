//! Generation tracking for asynchronous lookups.
//!
//! Every lookup is issued with a ticket. A completion is applied only if its
//! ticket is still the newest one for its slot; anything older is discarded,
//! so a slow response can never overwrite the result of a later request.

use std::collections::HashMap;

use crate::row::{PurchaseType, RowId};

/// What a lookup fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookupSlot {
    /// Identifier options of one row.
    Identifier(RowId),
    /// Owner and physician options of the form.
    Accounts,
}

/// The inputs a lookup was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKey {
    Items {
        device_id: i64,
        purchase_type: PurchaseType,
    },
    Accounts {
        client_id: i64,
    },
}

/// Handle for one in-flight lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    pub slot: LookupSlot,
    pub generation: u64,
    pub key: LookupKey,
}

impl LookupTicket {
    /// Row the lookup belongs to, if it is row-scoped.
    pub fn row(&self) -> Option<RowId> {
        match self.slot {
            LookupSlot::Identifier(row) => Some(row),
            LookupSlot::Accounts => None,
        }
    }
}

/// Latest generation per slot.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    generations: HashMap<LookupSlot, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding every earlier ticket for `slot`.
    pub fn issue(&mut self, slot: LookupSlot, key: LookupKey) -> LookupTicket {
        let generation = self.bump(slot);
        tracing::trace!(?slot, generation, "Lookup issued");
        LookupTicket {
            slot,
            generation,
            key,
        }
    }

    /// Invalidate any in-flight ticket for `slot`.
    pub fn cancel(&mut self, slot: LookupSlot) {
        let generation = self.bump(slot);
        tracing::trace!(?slot, generation, "Lookup cancelled");
    }

    /// Whether `ticket` is the newest issued for its slot.
    pub fn is_latest(&self, ticket: &LookupTicket) -> bool {
        self.generations.get(&ticket.slot) == Some(&ticket.generation)
    }

    fn bump(&mut self, slot: LookupSlot) -> u64 {
        let generation = self.generations.entry(slot).or_insert(0);
        *generation += 1;
        *generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: LookupKey = LookupKey::Items {
        device_id: 4,
        purchase_type: PurchaseType::Bulk,
    };

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let mut tracker = RequestTracker::new();
        let slot = LookupSlot::Identifier(RowId(0));
        let first = tracker.issue(slot, KEY);
        let second = tracker.issue(slot, KEY);

        assert!(!tracker.is_latest(&first));
        assert!(tracker.is_latest(&second));
    }

    #[test]
    fn test_cancel_invalidates() {
        let mut tracker = RequestTracker::new();
        let slot = LookupSlot::Identifier(RowId(0));
        let ticket = tracker.issue(slot, KEY);
        tracker.cancel(slot);
        assert!(!tracker.is_latest(&ticket));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut tracker = RequestTracker::new();
        let a = tracker.issue(LookupSlot::Identifier(RowId(0)), KEY);
        let b = tracker.issue(LookupSlot::Identifier(RowId(1)), KEY);
        assert!(tracker.is_latest(&a));
        assert!(tracker.is_latest(&b));
        assert_eq!(a.row(), Some(RowId(0)));
    }
}
