//! Profile registry and active-profile pointer.
//!
//! Profiles live in one bucket of the key-value substrate; the active
//! pointer is a separate key holding the profile's uuid string. The
//! collection store never reads these keys itself: callers resolve the
//! active id here and pass it into `card-collection` explicitly.

use std::sync::mpsc::Receiver;

use thiserror::Error;
use uuid::Uuid;

use card_error::{CardError, Result};
use card_model::ProfileRecord;
use fs_prefs::{BasePrefs, ChangeNotifier};

const PROFILES_KEY: &str = "profiles.v1";
const ACTIVE_ID_KEY: &str = "profiles.active.id";

/// Fallback username when nothing usable can be derived from the email.
const DEFAULT_USERNAME: &str = "Player";

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Username can't be empty.")]
    EmptyUsername,
    #[error(transparent)]
    Storage(#[from] CardError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    ActiveChanged,
}

/// A usable email is non-empty after trimming and at least looks
/// routable. Anything stricter belongs to the presentation layer.
pub fn is_valid_email(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && trimmed.contains('@') && trimmed.contains('.')
}

/// Username derived from the email local part, stripped down to
/// alphanumerics and underscores.
pub fn suggested_username(email: &str) -> String {
    let local = email.trim().split('@').next().unwrap_or_default();
    let cleaned: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if cleaned.is_empty() {
        DEFAULT_USERNAME.to_string()
    } else {
        cleaned
    }
}

/// Profile store over a key-value substrate.
pub struct ProfilesStore<P: BasePrefs> {
    /// Label for logging
    label: String,
    prefs: P,
    notifier: ChangeNotifier<ProfileEvent>,
}

impl<P: BasePrefs> ProfilesStore<P> {
    pub fn new(label: String, prefs: P) -> Self {
        Self {
            label,
            prefs,
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    /// Register for signals emitted when the active pointer moves.
    pub fn subscribe(&mut self) -> Receiver<ProfileEvent> {
        self.notifier.subscribe()
    }

    /// Every known profile. An absent or undecodable registry comes
    /// back as an empty list, never as an error.
    pub fn load_all(&self) -> Vec<ProfileRecord> {
        let Some(bytes) = self.prefs.get(PROFILES_KEY) else {
            return Vec::new();
        };
        match serde_json::from_slice(bytes) {
            Ok(profiles) => profiles,
            Err(err) => {
                log::warn!(
                    "profiles/{}: dropping undecodable registry: {}",
                    self.label,
                    err
                );
                Vec::new()
            }
        }
    }

    pub fn save_all(&mut self, profiles: &[ProfileRecord]) -> Result<()> {
        let bytes = serde_json::to_vec(profiles)?;
        self.prefs.set(PROFILES_KEY, bytes)
    }

    /// The profile currently scoping collection reads and writes.
    pub fn active_id(&self) -> Option<Uuid> {
        let bytes = self.prefs.get(ACTIVE_ID_KEY)?;
        let text = std::str::from_utf8(bytes).ok()?;
        Uuid::parse_str(text).ok()
    }

    pub fn set_active(&mut self, id: Option<Uuid>) -> Result<()> {
        match id {
            Some(id) => self
                .prefs
                .set(ACTIVE_ID_KEY, id.to_string().into_bytes())?,
            None => self.prefs.remove(ACTIVE_ID_KEY)?,
        }
        self.notifier.emit(ProfileEvent::ActiveChanged);
        Ok(())
    }

    /// Create or update a profile and make it active.
    ///
    /// Matches by `id` when given, otherwise by case-insensitive email;
    /// with no match a new record is created. A blank username is
    /// derived from the email local part.
    pub fn upsert(
        &mut self,
        id: Option<Uuid>,
        email: &str,
        username: &str,
        avatar_jpeg: Option<Vec<u8>>,
    ) -> std::result::Result<ProfileRecord, ProfileError> {
        let email = email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(ProfileError::InvalidEmail);
        }

        let mut username = username.trim().to_string();
        if username.is_empty() {
            username = suggested_username(&email);
        }
        if username.is_empty() {
            return Err(ProfileError::EmptyUsername);
        }

        let mut all = self.load_all();
        let matched = id
            .and_then(|id| all.iter().position(|p| p.id == id))
            .or_else(|| {
                all.iter()
                    .position(|p| p.email.to_lowercase() == email.to_lowercase())
            });

        let record = match matched {
            Some(idx) => {
                let existing = &mut all[idx];
                existing.email = email;
                existing.username = username;
                existing.avatar_jpeg = avatar_jpeg;
                existing.clone()
            }
            None => {
                let record = ProfileRecord::new(email, username, avatar_jpeg);
                all.push(record.clone());
                record
            }
        };

        self.save_all(&all)?;
        self.set_active(Some(record.id))?;
        log::debug!("profiles/{}: upserted profile {}", self.label, record.id);
        Ok(record)
    }

    /// Remove a profile. When the deleted profile was active, the first
    /// remaining profile (if any) becomes active.
    pub fn delete(&mut self, id: Uuid) -> Result<()> {
        let mut all = self.load_all();
        all.retain(|p| p.id != id);
        self.save_all(&all)?;

        if self.active_id() == Some(id) {
            self.set_active(all.first().map(|p| p.id))?;
        }
        Ok(())
    }
}
