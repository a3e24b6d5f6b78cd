//! Cryptographic building blocks for Bitcoin script verification.
//!
//! - Arbitrary-precision integers with modular arithmetic
//! - secp256k1 point arithmetic and SEC1 encodings
//! - ECDSA signing (RFC 6979 or random nonces), verification, recovery,
//!   strict DER and compact signature encodings
//! - SHA-1, SHA-256, double SHA-256, RIPEMD-160, Hash160, HMAC-SHA256
//! - Wire-format integers and a 32-byte hash identifier type

pub mod bigint;
pub mod chainhash;
pub mod ec;
pub mod ecdsa;
pub mod hash;
pub mod util;

mod error;
pub use bigint::BigInt;
pub use error::{ErrorKind, PrimitivesError};
