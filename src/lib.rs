//! Out-of-band secure certificate exchange.
//!
//! Transfers an X.509 certificate (including its private key) between
//! two parties over any channel that can carry short pasted text blocks,
//! with no pre-shared secret and no trusted third party.
//!
//! ## Protocol
//!
//! 1. Each side creates a [`KeyExchangeSession`], which generates an
//!    ephemeral P-256 key pair.
//! 2. Each side publishes its `PUBLIC KEY` block out-of-band and feeds
//!    the partner's block to [`KeyExchangeSession::derive_shared_secret`].
//! 3. The sender encrypts the certificate's binary export with
//!    [`KeyExchangeSession::encrypt`] and publishes the resulting
//!    `ENCRYPTED DATA` block; the receiver recovers the bytes with
//!    [`KeyExchangeSession::decrypt`].
//!
//! The payload is opaque to this crate: certificate parsing, export and
//! reconstruction belong to the caller, as does transporting the blocks.
//!
//! ## Security notes
//!
//! AES-256-CBC without an authentication tag provides confidentiality
//! only; tampering is not reliably detected. The raw ECDH output is used
//! directly as the symmetric key for wire compatibility with existing
//! peers.

pub mod codec;
pub mod error;
pub mod framing;
pub mod session;

pub use error::{ExchangeError, ExchangeResult};
pub use session::KeyExchangeSession;
