//! Dynamic placement claims
//!
//! Dynamic joysticks sharing a listening surface all receive the same
//! pointer-down. The first one to claim the pointer identifier handles it; the
//! others must ignore the event entirely.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::input::PointerId;
use crate::registry::JoystickId;

/// Set of currently claimed pointer identifiers
#[derive(Debug, Clone, Default)]
pub struct ClaimRegistry {
    claims: Arc<Mutex<HashMap<PointerId, JoystickId>>>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `pointer` for `claimant`
    ///
    /// Check and insert happen under one lock. Returns `false` when the
    /// identifier is already held, by this claimant or another.
    pub fn try_claim(&self, pointer: PointerId, claimant: JoystickId) -> bool {
        let mut claims = self.claims.lock();
        if let Some(holder) = claims.get(&pointer) {
            trace!("{} already claimed by joystick {}", pointer, holder);
            return false;
        }
        claims.insert(pointer, claimant);
        debug!("Joystick {} claimed {}", claimant, pointer);
        true
    }

    /// Drop a claim; no-op when absent
    pub fn release(&self, pointer: PointerId) -> bool {
        let released = self.claims.lock().remove(&pointer);
        if let Some(holder) = released {
            debug!("Joystick {} released {}", holder, pointer);
        }
        released.is_some()
    }

    /// Drop every claim held by `claimant` (teardown)
    pub fn release_all_for(&self, claimant: JoystickId) -> usize {
        let mut claims = self.claims.lock();
        let before = claims.len();
        claims.retain(|_, holder| *holder != claimant);
        before - claims.len()
    }

    pub fn holder(&self, pointer: PointerId) -> Option<JoystickId> {
        self.claims.lock().get(&pointer).copied()
    }

    pub fn is_claimed(&self, pointer: PointerId) -> bool {
        self.claims.lock().contains_key(&pointer)
    }

    pub fn len(&self) -> usize {
        self.claims.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.lock().is_empty()
    }
}
