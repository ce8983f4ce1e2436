pub mod base_prefs;
pub mod file_prefs;
pub mod memory_prefs;
pub mod notify;

pub use base_prefs::BasePrefs;
pub use file_prefs::FilePrefs;
pub use memory_prefs::MemoryPrefs;
pub use notify::ChangeNotifier;
