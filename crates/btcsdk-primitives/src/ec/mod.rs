//! secp256k1: domain parameters, points, keys and signatures.

pub mod curve;
pub mod point;
pub mod private_key;
pub mod public_key;
pub mod signature;

pub use point::{AffinePoint, Point};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::{RecoveryId, Signature};
