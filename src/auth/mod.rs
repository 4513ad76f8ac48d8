//! Authentication and session layer.
//!
//! JWT claim decoding, token persistence and the session store that ties
//! them to the API client.

pub mod jwt;
pub mod storage;
pub mod store;
