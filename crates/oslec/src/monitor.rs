//! Cross-instance monitoring registry.
//!
//! The kernel wrapper kept a spinlock-guarded "currently monitored instance"
//! pointer for its /proc diagnostics. The portable equivalent is this side
//! table: every canceller registers its [`ChannelId`] on creation and
//! deregisters on drop, and a diagnostics layer picks which channel it wants
//! to watch. The per-sample `update()` path never touches the table — stats
//! are read from the instance itself under whatever synchronization the host
//! already has.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

/// Process-unique identity of a canceller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(u64);

impl ChannelId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    live: BTreeSet<ChannelId>,
    monitored: Option<ChannelId>,
}

fn registry() -> &'static Mutex<RegistryInner> {
    static REGISTRY: OnceLock<Mutex<RegistryInner>> = OnceLock::new();
    REGISTRY.get_or_init(Mutex::default)
}

pub(crate) fn register(id: ChannelId) {
    let mut inner = registry().lock().expect("monitor registry poisoned");
    inner.live.insert(id);
}

pub(crate) fn deregister(id: ChannelId) {
    let mut inner = registry().lock().expect("monitor registry poisoned");
    inner.live.remove(&id);
    if inner.monitored == Some(id) {
        inner.monitored = None;
    }
}

/// Channel ids of all live canceller instances in this process.
pub fn live_channels() -> Vec<ChannelId> {
    let inner = registry().lock().expect("monitor registry poisoned");
    inner.live.iter().copied().collect()
}

/// Selects the channel a diagnostics reader wants to watch. Returns false
/// if the channel is not (or no longer) live.
pub fn set_monitored(id: ChannelId) -> bool {
    let mut inner = registry().lock().expect("monitor registry poisoned");
    if inner.live.contains(&id) {
        inner.monitored = Some(id);
        true
    } else {
        false
    }
}

/// The currently selected channel, if any. Cleared automatically when that
/// instance is dropped.
pub fn monitored() -> Option<ChannelId> {
    let inner = registry().lock().expect("monitor registry poisoned");
    inner.monitored
}
