//! Error types for the cabinet launcher

use thiserror::Error;

/// Errors that stop the launcher before its state machine can run.
///
/// Everything after setup is reported through imagery, never as an error.
#[derive(Debug, Error)]
pub enum CabinetError {
    #[error("No displays could be enumerated")]
    NoDisplays,
}

pub type Result<T> = std::result::Result<T, CabinetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            CabinetError::NoDisplays.to_string(),
            "No displays could be enumerated"
        );
    }
}
