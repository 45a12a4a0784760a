//! Pubkey hashing for the identify endpoint.
//!
//! Raw pubkeys are never handed out by the identify lookup. Callers get a
//! keyed digest instead, stable for a given `PUBKEY_HASH_KEY`.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::domain::{SwapIndex, normalize_coin};
use crate::error::TrackerError;

type HmacSha256 = Hmac<Sha256>;

/// Hashes pubkeys with HMAC-SHA256, or plain SHA-256 without a key.
#[derive(Clone)]
pub struct PubkeyHasher {
    key: Vec<u8>,
}

impl std::fmt::Debug for PubkeyHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubkeyHasher")
            .field("keyed", &!self.key.is_empty())
            .finish()
    }
}

impl PubkeyHasher {
    /// Creates a hasher for `key`. An empty key selects plain SHA-256.
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self {
            key: key.as_bytes().to_vec(),
        }
    }

    /// Lowercase hex digest of `pubkey`.
    #[must_use]
    pub fn hash(&self, pubkey: &str) -> String {
        if !self.key.is_empty() {
            if let Ok(mut mac) = HmacSha256::new_from_slice(&self.key) {
                mac.update(pubkey.as_bytes());
                return hex::encode(mac.finalize().into_bytes());
            }
        }
        hex::encode(Sha256::digest(pubkey.as_bytes()))
    }

    /// Hash of the pubkey that traded `ticker` in swap `uuid`.
    ///
    /// The ticker is compared canonically against the maker leg first,
    /// then the taker leg.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::SwapNotFound`] if `uuid` is not indexed.
    /// - [`TrackerError::TickerNotInSwap`] if neither leg trades `ticker`.
    /// - [`TrackerError::PubkeyNotFound`] if the matching leg has no pubkey.
    pub fn identify(
        &self,
        index: &SwapIndex,
        uuid: &str,
        ticker: &str,
    ) -> Result<String, TrackerError> {
        let swap = index
            .get(uuid)
            .ok_or_else(|| TrackerError::SwapNotFound(uuid.to_string()))?;
        let wanted = normalize_coin(ticker);
        let leg = swap
            .legs()
            .into_iter()
            .find(|leg| leg.symbol == wanted)
            .ok_or(TrackerError::TickerNotInSwap)?;
        let pubkey = leg.pubkey.ok_or(TrackerError::PubkeyNotFound)?;
        Ok(self.hash(pubkey))
    }
}
