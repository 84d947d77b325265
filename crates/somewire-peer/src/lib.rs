//! Consumer/producer roles over a SOME/IP transport.
//!
//! A [`Participant`] is just an identity paired with a transport. The only
//! behavior here is request/reply correlation: [`exchange`] sends a request
//! and accepts the reply only if it carries the same request identity.

pub mod error;
pub mod exchange;
pub mod role;

pub use error::{PeerError, Result};
pub use exchange::{exchange, response_to};
pub use role::{Participant, Role};
