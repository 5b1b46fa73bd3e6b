//! Ephemeral P-256 key exchange session.
//!
//! A session owns a freshly generated ephemeral key pair, publishes its
//! public half as a pasteable text block, and derives a shared symmetric
//! key once the partner's block arrives. The raw ECDH output is used
//! directly as the AES-256 key to stay wire-compatible with existing
//! peers; no KDF pass is applied.
//!
//! One session covers one handshake with one partner. Deriving against a
//! second partner key overwrites the previous secret, so callers must use
//! a fresh session per logical exchange.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use rand::rngs::OsRng;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::codec::{self, KEY_LEN};
use crate::error::{ExchangeError, ExchangeResult};
use crate::framing::{frame, unframe, PUBLIC_KEY_TAG};

/// A single-partner ECDH handshake plus the message codec keyed by it.
///
/// Lifecycle: created (key pair only) -> key exchanged (shared secret
/// derived). There is no way back; discard the session when done. The
/// shared secret is zeroized when the session drops.
pub struct KeyExchangeSession {
    local: EphemeralSecret,
    shared: Option<Zeroizing<[u8; KEY_LEN]>>,
}

impl KeyExchangeSession {
    /// Generate a fresh ephemeral P-256 key pair.
    ///
    /// Key generation draws from the OS entropy source and only fails by
    /// aborting the process if that source is unavailable.
    pub fn new() -> Self {
        let local = EphemeralSecret::random(&mut OsRng);
        debug!("Generated ephemeral P-256 keypair for certificate exchange");
        Self {
            local,
            shared: None,
        }
    }

    /// Export the local public key as a framed `PUBLIC KEY` block.
    ///
    /// The body is the base64 of the SEC1 uncompressed point encoding.
    /// Repeatable and side-effect free.
    pub fn export_public_key(&self) -> String {
        let point = self.local.public_key().to_encoded_point(false);
        frame(PUBLIC_KEY_TAG, &BASE64.encode(point.as_bytes()))
    }

    /// Run ECDH against the partner's framed public key block, storing
    /// the 32-byte shared secret in the session.
    ///
    /// Accepts blocks with or without marker lines. Fails with
    /// [`ExchangeError::MalformedPublicKey`] when the body is not valid
    /// base64 or does not decode to a P-256 point.
    pub fn derive_shared_secret(&mut self, partner_block: &str) -> ExchangeResult<()> {
        let raw = BASE64
            .decode(unframe(partner_block))
            .map_err(|_| ExchangeError::MalformedPublicKey)?;
        let partner =
            PublicKey::from_sec1_bytes(&raw).map_err(|_| ExchangeError::MalformedPublicKey)?;

        if self.shared.is_some() {
            warn!("Shared secret re-derived - previous partner secret is discarded");
        }

        let ecdh = self.local.diffie_hellman(&partner);
        let mut secret = Zeroizing::new([0u8; KEY_LEN]);
        secret.copy_from_slice(ecdh.raw_secret_bytes().as_slice());
        self.shared = Some(secret);
        debug!("Derived shared secret from partner public key");
        Ok(())
    }

    /// Whether key agreement has completed.
    pub fn is_key_exchanged(&self) -> bool {
        self.shared.is_some()
    }

    fn shared_secret(&self) -> ExchangeResult<&[u8]> {
        self.shared
            .as_deref()
            .map(|s| s.as_slice())
            .ok_or(ExchangeError::SharedSecretMissing)
    }

    /// Encrypt an opaque payload (e.g. a certificate export) into a
    /// framed `ENCRYPTED DATA` block under the derived secret.
    ///
    /// Fails with [`ExchangeError::SharedSecretMissing`] before key
    /// agreement; no partial work is performed in that case.
    pub fn encrypt(&self, payload: &[u8]) -> ExchangeResult<String> {
        codec::encrypt_block(payload, self.shared_secret()?)
    }

    /// Decrypt a framed `ENCRYPTED DATA` block back into payload bytes
    /// under the derived secret.
    ///
    /// Fails with [`ExchangeError::SharedSecretMissing`] before key
    /// agreement.
    pub fn decrypt(&self, block: &str) -> ExchangeResult<Vec<u8>> {
        codec::decrypt_block(block, self.shared_secret()?)
    }
}

impl Default for KeyExchangeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeyExchangeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyExchangeSession")
            .field("key_exchanged", &self.is_key_exchanged())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_generate_distinct_keys() {
        let a = KeyExchangeSession::new();
        let b = KeyExchangeSession::new();
        assert_ne!(a.export_public_key(), b.export_public_key());
    }

    #[test]
    fn test_export_is_repeatable() {
        let session = KeyExchangeSession::new();
        assert_eq!(session.export_public_key(), session.export_public_key());
    }

    #[test]
    fn test_exported_block_shape() {
        let block = KeyExchangeSession::new().export_public_key();
        assert!(block.starts_with("-----BEGIN PUBLIC KEY-----"));
        assert!(block.ends_with("-----END PUBLIC KEY-----"));
        // SEC1 uncompressed P-256 point is 65 bytes.
        let raw = BASE64.decode(unframe(&block)).unwrap();
        assert_eq!(raw.len(), 65);
        assert_eq!(raw[0], 0x04);
    }

    #[test]
    fn test_ecdh_symmetry_and_round_trip() {
        let mut alice = KeyExchangeSession::new();
        let mut bob = KeyExchangeSession::new();

        let p_a = alice.export_public_key();
        let p_b = bob.export_public_key();

        alice.derive_shared_secret(&p_b).unwrap();
        bob.derive_shared_secret(&p_a).unwrap();
        assert_eq!(
            alice.shared_secret().unwrap(),
            bob.shared_secret().unwrap()
        );

        let block = alice.encrypt(b"hello").unwrap();
        assert_eq!(bob.decrypt(&block).unwrap(), b"hello");
    }

    #[test]
    fn test_encrypt_before_key_agreement_fails() {
        let session = KeyExchangeSession::new();
        assert!(matches!(
            session.encrypt(b"payload"),
            Err(ExchangeError::SharedSecretMissing)
        ));
        assert!(matches!(
            session.decrypt("-----BEGIN ENCRYPTED DATA-----\nAA==\n-----END ENCRYPTED DATA-----"),
            Err(ExchangeError::SharedSecretMissing)
        ));
    }

    #[test]
    fn test_malformed_partner_key_rejected() {
        let mut session = KeyExchangeSession::new();

        // Valid base64 without markers, but the wrong length for a point.
        let err = session
            .derive_shared_secret(&BASE64.encode([1u8; 16]))
            .unwrap_err();
        assert!(matches!(err, ExchangeError::MalformedPublicKey));

        // Not base64 at all.
        let err = session.derive_shared_secret("@@ not a key @@").unwrap_err();
        assert!(matches!(err, ExchangeError::MalformedPublicKey));

        // Session stays usable for a valid partner afterwards.
        assert!(!session.is_key_exchanged());
        let partner = KeyExchangeSession::new();
        session
            .derive_shared_secret(&partner.export_public_key())
            .unwrap();
        assert!(session.is_key_exchanged());
    }

    #[test]
    fn test_rederive_overwrites_secret() {
        let mut session = KeyExchangeSession::new();
        let first = KeyExchangeSession::new();
        let second = KeyExchangeSession::new();

        session
            .derive_shared_secret(&first.export_public_key())
            .unwrap();
        let secret_one = session.shared_secret().unwrap().to_vec();

        session
            .derive_shared_secret(&second.export_public_key())
            .unwrap();
        assert_ne!(session.shared_secret().unwrap(), secret_one.as_slice());
    }

    #[test]
    fn test_unframed_partner_key_accepted() {
        // Marker-agnostic parsing: a bare base64 point still derives.
        let mut session = KeyExchangeSession::new();
        let partner = KeyExchangeSession::new();
        let bare = unframe(&partner.export_public_key());
        session.derive_shared_secret(&bare).unwrap();
        assert!(session.is_key_exchanged());
    }
}
