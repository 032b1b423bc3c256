//! Glossa Cache - Session-scoped animation cache
//!
//! Maps a gloss to its animation payload for the lifetime of one video
//! session. Concurrent lookups for a gloss that is still being fetched share
//! one provider request.
//!
//! # Outcome policy
//!
//! | Provider result      | Delivered to waiters  | Cached |
//! |----------------------|-----------------------|--------|
//! | valid payload        | payload               | yes    |
//! | malformed payload    | basic fallback        | yes    |
//! | `Error` tier         | the error payload     | no     |
//! | fetch failure        | the error             | no     |

pub mod cache;

pub use cache::*;
