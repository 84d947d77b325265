//! SOME/IP wire framing.
//!
//! somewire encodes and decodes the 16-byte SOME/IP header and moves frames
//! over UDP, with no discovery or session machinery on top.
//!
//! # Crate Structure
//!
//! - [`frame`]: Header model, validation, encode/decode, identities
//! - [`transport`]: UDP transport (blocking; tokio behind `async`)
//! - [`peer`]: Consumer/producer roles and request/reply exchange (behind `peer` feature)

/// Re-export frame types.
pub mod frame {
    pub use somewire_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use somewire_transport::*;
}

/// Re-export peer types (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use somewire_peer::*;
}
