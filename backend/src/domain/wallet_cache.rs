//! Bounded per-wallet cache shared by the dashboard services.
//!
//! Entries are keyed by wallet address. Once the cache holds `capacity`
//! wallets, inserting another evicts the least recently used one. Reads and
//! writes both count as use.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::WalletAddress;

/// Default number of wallets a service remembers.
pub const WALLET_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

#[derive(Debug)]
struct Slot<V> {
    last_used: u64,
    value: V,
}

#[derive(Debug)]
struct Entries<V> {
    slots: HashMap<WalletAddress, Slot<V>>,
    clock: u64,
}

impl<V> Entries<V> {
    fn tick(&mut self) -> u64 {
        self.clock = self.clock.wrapping_add(1);
        self.clock
    }

    fn evict_for(&mut self, address: &WalletAddress, capacity: NonZeroUsize) {
        if self.slots.contains_key(address) || self.slots.len() < capacity.get() {
            return;
        }
        let oldest = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(key, _)| key.clone());
        if let Some(oldest) = oldest {
            self.slots.remove(&oldest);
        }
    }
}

/// Least-recently-used map from wallet address to `V`.
#[derive(Debug)]
pub struct WalletCache<V> {
    capacity: NonZeroUsize,
    entries: Mutex<Entries<V>>,
}

impl<V> Default for WalletCache<V> {
    fn default() -> Self {
        Self::new(WALLET_CACHE_CAPACITY)
    }
}

impl<V> WalletCache<V> {
    /// Create an empty cache holding at most `capacity` wallets.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries {
                slots: HashMap::new(),
                clock: 0,
            }),
        }
    }

    /// Number of wallets currently cached.
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// Whether no wallet is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Entries<V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `read` against the entry for `address`, marking it used.
    pub fn inspect<R>(&self, address: &WalletAddress, read: impl FnOnce(&V) -> R) -> Option<R> {
        let mut entries = self.lock();
        let now = entries.tick();
        entries.slots.get_mut(address).map(|slot| {
            slot.last_used = now;
            read(&slot.value)
        })
    }

    /// Replace the entry for `address`.
    pub fn insert(&self, address: &WalletAddress, value: V) {
        let mut entries = self.lock();
        entries.evict_for(address, self.capacity);
        let last_used = entries.tick();
        entries
            .slots
            .insert(address.clone(), Slot { last_used, value });
    }
}

impl<V: Clone> WalletCache<V> {
    /// Copy of the entry for `address`.
    pub fn get(&self, address: &WalletAddress) -> Option<V> {
        self.inspect(address, V::clone)
    }
}

impl<V: Default> WalletCache<V> {
    /// Apply `change` to the entry for `address`, creating it if absent.
    pub fn update(&self, address: &WalletAddress, change: impl FnOnce(&mut V)) {
        let mut entries = self.lock();
        entries.evict_for(address, self.capacity);
        let now = entries.tick();
        let slot = entries.slots.entry(address.clone()).or_insert_with(|| Slot {
            last_used: now,
            value: V::default(),
        });
        slot.last_used = now;
        change(&mut slot.value);
    }
}
