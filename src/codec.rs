//! Secure block codec: AES-256-CBC encryption of opaque payloads into
//! pasteable text blocks.
//!
//! Block layout, outermost first:
//! - PEM-style framing with the `ENCRYPTED DATA` tag ([`crate::framing`])
//! - base64 of `base64(IV) || "|" || base64(ciphertext)`
//! - AES-256-CBC with PKCS#7 padding and a fresh random 16-byte IV
//!
//! CBC carries no authentication tag: a corrupted or tampered block may
//! decrypt to garbage instead of failing. Callers that need integrity
//! must verify the recovered payload themselves.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::error::{ExchangeError, ExchangeResult};
use crate::framing::{frame, unframe, ENCRYPTED_DATA_TAG};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// AES block / IV length in bytes.
pub const IV_LEN: usize = 16;

/// Separator between the encoded IV and the encoded ciphertext.
const IV_DELIMITER: char = '|';

fn check_key(key: &[u8]) -> ExchangeResult<()> {
    if key.len() != KEY_LEN {
        return Err(ExchangeError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: key.len(),
        });
    }
    Ok(())
}

/// Encrypt `payload` under `key`, returning a framed `ENCRYPTED DATA` block.
///
/// A fresh random IV is drawn per call, so two encryptions of the same
/// payload produce different blocks.
pub fn encrypt_block(payload: &[u8], key: &[u8]) -> ExchangeResult<String> {
    check_key(key)?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new_from_slices(key, &iv)
        .map_err(|_| ExchangeError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: key.len(),
        })?
        .encrypt_padded_vec_mut::<Pkcs7>(payload);

    let inner = format!(
        "{}{}{}",
        BASE64.encode(iv),
        IV_DELIMITER,
        BASE64.encode(ciphertext)
    );
    Ok(frame(ENCRYPTED_DATA_TAG, &BASE64.encode(inner)))
}

/// Decrypt a framed `ENCRYPTED DATA` block under `key`, returning the
/// original payload bytes.
///
/// Fails on malformed framing (missing delimiter, invalid base64) and on
/// padding errors. Padding checks are not an integrity guarantee; see the
/// module docs.
pub fn decrypt_block(block: &str, key: &[u8]) -> ExchangeResult<Vec<u8>> {
    check_key(key)?;

    let inner_bytes = BASE64.decode(unframe(block))?;
    let inner = String::from_utf8(inner_bytes).map_err(|_| ExchangeError::MissingDelimiter)?;

    let (iv_b64, ciphertext_b64) = inner
        .split_once(IV_DELIMITER)
        .ok_or(ExchangeError::MissingDelimiter)?;

    let iv = BASE64.decode(iv_b64)?;
    if iv.len() != IV_LEN {
        return Err(ExchangeError::InvalidIvLength {
            expected: IV_LEN,
            actual: iv.len(),
        });
    }
    let ciphertext = BASE64.decode(ciphertext_b64)?;

    Aes256CbcDec::new_from_slices(key, &iv)
        .map_err(|_| ExchangeError::DecryptionFailed)?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| ExchangeError::DecryptionFailed)
}
