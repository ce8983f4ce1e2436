use thiserror::Error;

use card_error::CardError;
use card_profiles::ProfileError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Couldn't retrieve the user data directory!")]
    DataDirNotFound,

    #[error("No profile matches '{0}'")]
    ProfileNotFound(String),

    #[error(transparent)]
    ProfileError(#[from] ProfileError),

    #[error(transparent)]
    CardError(#[from] CardError),
}
