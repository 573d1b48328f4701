pub use anyhow::Result;

use thiserror::Error;

/// Failures reported by a [`Board`](crate::robot::Board)
///
/// Board implementations return these wrapped in an [`anyhow::Error`], the driver only adds
/// context on the way up. Use [`BoardError::find`] to recover the kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The board could not be detected
    #[error("board not detected: {0}")]
    HardwareInit(String),

    /// The board firmware major version is not the one this driver requires
    #[error("incompatible firmware {found}, need major version {required}")]
    FirmwareVersion { found: String, required: u8 },

    /// Any other I/O failure while talking to the board
    #[error("hardware fault: {0}")]
    HardwareFault(String),
}

impl BoardError {
    pub fn fault(what: impl Into<String>) -> Self {
        BoardError::HardwareFault(what.into())
    }

    /// Looks through the context chain of `err` for a `BoardError`
    pub fn find(err: &anyhow::Error) -> Option<&BoardError> {
        err.chain().find_map(|cause| cause.downcast_ref::<BoardError>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn find_through_context() {
        let err = Err::<(), _>(BoardError::fault("spi"))
            .context("Read left encoder")
            .context("Drive")
            .unwrap_err();

        assert_eq!(BoardError::find(&err), Some(&BoardError::fault("spi")));
        assert!(format!("{err:#}").contains("hardware fault: spi"));
    }

    #[test]
    fn firmware_message() {
        let err = BoardError::FirmwareVersion {
            found: "0.3.4".to_string(),
            required: 1,
        };
        let msg = format!("{err}");
        assert!(msg.contains("0.3.4"));
        assert!(msg.contains("major version 1"));
    }
}
