//! Error taxonomy for the property list

use crate::models::PropertyId;

/// A read from the property store failed or returned something we could not interpret
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected response shape from {url}: {source}")]
    Shape {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A write to the property store failed
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("delete of property {id} failed: {source}")]
    Transport {
        id: PropertyId,
        #[source]
        source: reqwest::Error,
    },

    #[error("delete of property {id} rejected with status {status}")]
    Status { id: PropertyId, status: u16 },
}

/// Anything a controller operation can surface to its caller
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}
