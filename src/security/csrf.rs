//! Stateless CSRF tokens.
//!
//! A token is `base64url(nonce || HMAC-SHA256(secret, nonce)[..16])`:
//! self-authenticating, so no server-side session state is needed. Pages
//! embed a freshly minted token in the add form; every mutating route
//! requires one and verifies the MAC, not just presence.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

/// Mints and verifies CSRF tokens with a process-wide signing secret.
pub struct CsrfProtect {
    secret: Vec<u8>,
}

impl CsrfProtect {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// Mint a fresh token.
    pub fn issue(&self) -> String {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill(&mut nonce);

        let tag = self.sign(&nonce);
        let mut raw = Vec::with_capacity(NONCE_LEN + TAG_LEN);
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&tag[..TAG_LEN]);
        URL_SAFE_NO_PAD.encode(raw)
    }

    /// Verify a submitted token: format first, then the MAC in constant
    /// time.
    pub fn verify(&self, token: &str) -> bool {
        if !validate_token_format(token) {
            return false;
        }

        let Ok(raw) = URL_SAFE_NO_PAD.decode(token) else {
            return false;
        };
        if raw.len() != NONCE_LEN + TAG_LEN {
            return false;
        }

        let (nonce, tag) = raw.split_at(NONCE_LEN);
        let expected = self.sign(nonce);
        expected[..TAG_LEN].ct_eq(tag).into()
    }

    fn sign(&self, nonce: &[u8]) -> [u8; 32] {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(nonce);
        mac.finalize().into_bytes().into()
    }
}

/// Token shape check: base64url alphabet, reasonable length.
pub fn validate_token_format(token: &str) -> bool {
    (16..=128).contains(&token.len())
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
