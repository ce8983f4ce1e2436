//! Profile-scoped persistence for card collections.
//!
//! Each profile owns one bucket in the key-value substrate, addressed
//! by a deterministic key derived from the profile id. A legacy,
//! pre-multi-profile bucket is migrated into a profile's bucket the
//! first time that profile loads with no scoped data of its own.
//!
//! The profile scope is an explicit parameter on every operation;
//! callers resolve the active profile through `card-profiles` and pass
//! it in. The store performs no internal locking: concurrent
//! read-modify-write cycles against the same profile race, and the
//! last save wins.

use std::sync::mpsc::Receiver;

use uuid::Uuid;

use card_error::Result;
use card_identity::{fold_name, identity_key, normalize};
use card_model::{Card, CollectedCard};
use fs_prefs::{BasePrefs, ChangeNotifier};

/// Bucket key of the pre-multi-profile collection, consulted and
/// erased during one-time migration.
pub const LEGACY_BUCKET_KEY: &str = "collection.v1";

const NO_PROFILE_SENTINEL: &str = "no-profile";

/// Bucket key for a profile's collection.
pub fn bucket_key(profile: Option<Uuid>) -> String {
    match profile {
        Some(id) => format!("{}.{}", LEGACY_BUCKET_KEY, id),
        None => format!("{}.{}", LEGACY_BUCKET_KEY, NO_PROFILE_SENTINEL),
    }
}

/// Fire-and-forget signal emitted after a mutating operation has
/// persisted its write. No payload; consumers re-read what they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    Changed,
}

/// Collection store over a key-value substrate.
pub struct CollectionStore<P: BasePrefs> {
    /// Label for logging
    label: String,
    prefs: P,
    notifier: ChangeNotifier<CollectionEvent>,
}

impl<P: BasePrefs> CollectionStore<P> {
    pub fn new(label: String, prefs: P) -> Self {
        Self {
            label,
            prefs,
            notifier: ChangeNotifier::new(),
        }
    }

    /// The underlying substrate, for callers that co-locate other
    /// buckets in the same store.
    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    /// Register for change signals emitted after each mutation.
    pub fn subscribe(&mut self) -> Receiver<CollectionEvent> {
        self.notifier.subscribe()
    }

    /// Raw (unnormalized) entries of the profile's bucket.
    ///
    /// Runs the one-time legacy migration first. An absent bucket and a
    /// bucket that fails to decode both come back as an empty sequence;
    /// corrupt data is never surfaced as an error here.
    pub fn load(&mut self, profile: Option<Uuid>) -> Vec<CollectedCard> {
        let scoped = bucket_key(profile);
        self.migrate_legacy(&scoped);

        let Some(bytes) = self.prefs.get(&scoped) else {
            return Vec::new();
        };
        match serde_json::from_slice(bytes) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!(
                    "collection/{}: dropping undecodable bucket {}: {}",
                    self.label,
                    scoped,
                    err
                );
                Vec::new()
            }
        }
    }

    /// Move the legacy unscoped bucket into `scoped`, at most once:
    /// never when the scoped bucket already holds data, even
    /// empty-but-present data.
    fn migrate_legacy(&mut self, scoped: &str) {
        if !self.prefs.contains(LEGACY_BUCKET_KEY) || self.prefs.contains(scoped) {
            return;
        }
        let bytes = self
            .prefs
            .get(LEGACY_BUCKET_KEY)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        let moved = self
            .prefs
            .set(scoped, bytes)
            .and_then(|()| self.prefs.remove(LEGACY_BUCKET_KEY));
        match moved {
            Ok(()) => log::debug!(
                "collection/{}: migrated legacy bucket into {}",
                self.label,
                scoped
            ),
            // Legacy data is still in place, so the next load retries.
            Err(err) => log::warn!(
                "collection/{}: legacy migration into {} failed: {}",
                self.label,
                scoped,
                err
            ),
        }
    }

    /// The read path for presentation callers: merged entries sorted by
    /// rarity rank (mythic, rare, uncommon, common, everything else),
    /// ties broken case-insensitively by name.
    pub fn normalized_sorted(&mut self, profile: Option<Uuid>) -> Vec<CollectedCard> {
        let mut entries = normalize(self.load(profile));
        entries.sort_by_cached_key(|e| (e.card.rarity_order(), fold_name(&e.card.name)));
        entries
    }

    /// Persist `entries` into the profile's bucket, always in
    /// normalized form. Encode and write failures surface as `Err`.
    pub fn save(&mut self, profile: Option<Uuid>, entries: Vec<CollectedCard>) -> Result<()> {
        let normalized = normalize(entries);
        let bytes = serde_json::to_vec(&normalized)?;
        self.prefs.set(&bucket_key(profile), bytes)
    }

    /// Append freshly pulled cards. A card whose identity key matches
    /// an existing entry increments that entry's count; anything else
    /// becomes a new entry with count 1.
    pub fn append(&mut self, profile: Option<Uuid>, new_cards: Vec<Card>) -> Result<()> {
        let mut current = self.load(profile);
        for card in new_cards {
            let key = identity_key(&card);
            match current
                .iter_mut()
                .find(|entry| identity_key(&entry.card) == key)
            {
                Some(entry) => entry.count = entry.count.saturating_add(1),
                None => current.push(CollectedCard::new(card)),
            }
        }
        // save() merges any residual duplicates among the loaded rows.
        self.save(profile, current)?;
        self.notifier.emit(CollectionEvent::Changed);
        Ok(())
    }

    /// Total copies held under `card`'s identity key; 0 when absent.
    pub fn count_for(&mut self, profile: Option<Uuid>, card: &Card) -> u32 {
        let key = identity_key(card);
        normalize(self.load(profile))
            .iter()
            .filter(|entry| identity_key(&entry.card) == key)
            .map(|entry| entry.count)
            .sum()
    }

    /// Remove up to `quantity` copies of the card matching `target`'s
    /// identity key, clamped to what is held. Returns the number of
    /// copies actually removed; an entry reaching count 0 is dropped
    /// from the bucket entirely.
    pub fn delete(&mut self, profile: Option<Uuid>, target: &Card, quantity: u32) -> Result<u32> {
        if quantity == 0 {
            return Ok(0);
        }

        let mut current = normalize(self.load(profile));
        let key = identity_key(target);
        let Some(idx) = current
            .iter()
            .position(|entry| identity_key(&entry.card) == key)
        else {
            return Ok(0);
        };

        let removed = quantity.min(current[idx].count);
        current[idx].count -= removed;
        if current[idx].count == 0 {
            current.remove(idx);
        }

        self.save(profile, current)?;
        self.notifier.emit(CollectionEvent::Changed);
        Ok(removed)
    }

    /// Drop every entry in the profile's bucket.
    pub fn clear(&mut self, profile: Option<Uuid>) -> Result<()> {
        self.save(profile, Vec::new())?;
        self.notifier.emit(CollectionEvent::Changed);
        Ok(())
    }
}
