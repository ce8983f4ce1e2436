pub mod card;
pub mod profile;

pub use card::{Card, CardFace, CollectedCard};
pub use profile::ProfileRecord;
