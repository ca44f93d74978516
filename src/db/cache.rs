//! Development-only pool cache.
//!
//! A dev server may re-run data layer initialization many times inside one
//! process (every reload). Without this cache each run would open a fresh set
//! of connections and leak the old ones until the database refuses new
//! clients. The cache holds at most one pool for the life of the process and
//! is never torn down explicitly; it goes away when the process exits.
//!
//! Only the supervisor touches it, and only when the context is Development.
//! The supervisor keeps the slot locked from lookup until the new pool is
//! stored, so overlapping initializations build at most one pool.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use super::{Database, DbPool};

/// A pool and the data access handle bound to it.
#[derive(Debug, Clone)]
pub struct CachedPool {
    pub pool: Arc<DbPool>,
    pub db: Arc<Database>,
}

/// Slot holding at most one [`CachedPool`].
///
/// Tests create their own instances to simulate separate processes; the
/// binary uses [`DevPoolCache::process`].
#[derive(Debug, Default)]
pub struct DevPoolCache {
    slot: Mutex<Option<CachedPool>>,
}

static PROCESS_CACHE: DevPoolCache = DevPoolCache::new();

impl DevPoolCache {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::const_new(None),
        }
    }

    /// The cache shared by everything in this process.
    pub fn process() -> &'static DevPoolCache {
        &PROCESS_CACHE
    }

    /// Exclusive access to the slot until the returned guard is dropped.
    pub async fn lock(&self) -> CacheSlot<'_> {
        CacheSlot {
            slot: self.slot.lock().await,
        }
    }
}

/// Locked view of the cache.
pub struct CacheSlot<'a> {
    slot: MutexGuard<'a, Option<CachedPool>>,
}

impl CacheSlot<'_> {
    /// Cached pair, if any.
    ///
    /// A pool that has already been closed is dropped from the slot and
    /// reported as a miss.
    pub fn get(&mut self) -> Option<CachedPool> {
        if self.slot.as_ref().is_some_and(|cached| cached.pool.is_closed()) {
            tracing::warn!("Cached database pool was closed, discarding it");
            *self.slot = None;
        }

        self.slot.clone()
    }

    /// Store a pair, replacing whatever was there.
    pub fn set(&mut self, pool: Arc<DbPool>, db: Arc<Database>) {
        *self.slot = Some(CachedPool { pool, db });
        tracing::debug!("Database pool stored in development cache");
    }
}
