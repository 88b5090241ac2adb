// src/domain/error.rs
use thiserror::Error;

/// Failure modes when talking to AnkiConnect.
///
/// `Transport` covers everything below the protocol: connection refused,
/// timeout, non-success HTTP status, unparseable body. `Api` means the HTTP
/// exchange worked but AnkiConnect reported an error in the response
/// envelope, or the envelope broke the protocol contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("AnkiConnect error: {0}")]
    Api(String),
}
