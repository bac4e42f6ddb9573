//! Shared context for a group of joystick instances
//!
//! Every instance created with the same context shares one claim set, one
//! instance registry and one event sequence. Separate contexts are fully
//! isolated from each other.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::placement::ClaimRegistry;
use crate::registry::InstanceRegistry;

#[derive(Debug, Clone, Default)]
pub struct JoystickContext {
    claims: ClaimRegistry,
    instances: InstanceRegistry,
    sequence: Arc<AtomicU64>,
}

impl JoystickContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claims(&self) -> &ClaimRegistry {
        &self.claims
    }

    pub fn instances(&self) -> &InstanceRegistry {
        &self.instances
    }

    /// Next host event sequence number (starts at 1, never repeats)
    pub fn next_event_seq(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}
