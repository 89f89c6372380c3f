use mongodb::error::{ErrorKind, WriteFailure};

const DUPLICATE_KEY_CODE: i32 = 11000;
const TRANSIENT_TRANSACTION_ERROR: &str = "TransientTransactionError";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    ///
    /// Optimistic version check failed, another writer
    /// modified the document first
    ///
    #[error("stale version")]
    StaleVersion,

    #[error("insert unique violation")]
    InsertUniqueViolation,

    ///
    /// Transaction aborted because it raced with another transaction.
    /// Safe to retry from the beginning
    ///
    #[error("write conflict")]
    WriteConflict,

    #[error("corrupted document: {0}")]
    Corrupted(&'static str),

    #[error("mongo error: {0}")]
    Mongo(mongodb::error::Error),
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        if err.contains_label(TRANSIENT_TRANSACTION_ERROR) {
            return Error::WriteConflict;
        }

        if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *err.kind {
            if write_error.code == DUPLICATE_KEY_CODE {
                return Error::InsertUniqueViolation;
            }
        }

        Error::Mongo(err)
    }
}
