use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::store::StoreError;

/// Fatal startup and serve-loop failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("database connection failed: {0}")]
    Connect(#[source] StoreError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server failed: {0}")]
    Serve(#[source] io::Error),
}
