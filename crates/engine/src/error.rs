use lineup_core::error::{CoreError, SpotError};
use lineup_db::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Spot(#[from] SpotError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// The lifecycle error, if this is an expected domain outcome.
    pub fn as_spot_error(&self) -> Option<&SpotError> {
        match self {
            EngineError::Spot(e) => Some(e),
            _ => None,
        }
    }
}
