//! Instance registry - live joystick instances within one context
//!
//! Used only for diagnostics: a joystick created on the same target a live
//! dynamic joystick listens on is legal but discouraged, and is reported as a
//! [`ConfigConflict`].

use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::input::ListenTarget;

/// Ids are drawn from one process-wide counter so layer element ids never
/// collide, even across separate contexts in the same document.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable, process-wide unique identifier of a joystick instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JoystickId(u64);

impl JoystickId {
    /// Element ids of the three visual layers
    pub fn layer_ids(self) -> LayerIds {
        LayerIds {
            container: format!("joystick-container-{}", self),
            controller: format!("joystick-controller-{}", self),
            joystick: format!("joystick-{}", self),
        }
    }
}

impl fmt::Display for JoystickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element ids for the outer anchor, the ring and the inner dot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerIds {
    pub container: String,
    pub controller: String,
    pub joystick: String,
}

/// What the registry remembers about a live instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub id: JoystickId,
    pub dynamic: bool,
    pub target: ListenTarget,
}

/// A new joystick shares its target with a live dynamic joystick
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "joystick {new} uses target {target}, already the dynamic-position target of \
     joystick {existing}; use separate targets to prevent event collisions"
)]
pub struct ConfigConflict {
    pub new: JoystickId,
    pub existing: JoystickId,
    pub target: ListenTarget,
}

#[derive(Debug, Default)]
struct RegistryInner {
    instances: Vec<InstanceRecord>,
}

/// Shared list of constructed, non-destroyed instances
#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next instance id (never reused within the process)
    pub fn allocate_id(&self) -> JoystickId {
        JoystickId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Record a new instance
    ///
    /// Returns the conflict diagnostic, if any: some live dynamic instance
    /// already listens on the new record's target, whatever the new record's
    /// own mode. Registration always succeeds.
    pub fn register(&self, record: InstanceRecord) -> Option<ConfigConflict> {
        let mut inner = self.inner.lock();

        let conflict = inner
            .instances
            .iter()
            .find(|existing| existing.dynamic && existing.target == record.target)
            .map(|existing| ConfigConflict {
                new: record.id,
                existing: existing.id,
                target: record.target.clone(),
            });

        if let Some(conflict) = &conflict {
            warn!("{}", conflict);
        }

        debug!("Registered joystick {} (dynamic: {})", record.id, record.dynamic);
        inner.instances.push(record);
        conflict
    }

    /// Remove an instance; returns whether it was registered
    pub fn deregister(&self, id: JoystickId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.instances.len();
        inner.instances.retain(|record| record.id != id);
        let removed = inner.instances.len() != before;
        if removed {
            debug!("Deregistered joystick {}", id);
        }
        removed
    }

    pub fn contains(&self, id: JoystickId) -> bool {
        self.inner.lock().instances.iter().any(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().instances.is_empty()
    }
}
