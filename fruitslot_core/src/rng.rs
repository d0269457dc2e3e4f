use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Hex SHA-256 of a server seed, published before the round is dealt.
pub fn seed_commitment(server_seed: &str) -> String {
    hex::encode(Sha256::digest(server_seed.as_bytes()))
}

/// The three inputs that pin down a seeded round. The draw stream is
/// ChaCha20 keyed by HMAC-SHA256(server_seed, "client_seed:nonce").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSeeds {
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
}

impl RoundSeeds {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
        }
    }

    pub fn commitment(&self) -> String {
        seed_commitment(&self.server_seed)
    }

    /// Every call restarts the same stream, so a revealed seed replays the
    /// exact board.
    pub fn draw_rng(&self) -> ChaCha20Rng {
        let mut mac = HmacSha256::new_from_slice(self.server_seed.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(self.client_seed.as_bytes());
        mac.update(b":");
        mac.update(self.nonce.to_string().as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&mac.finalize().into_bytes());
        ChaCha20Rng::from_seed(key)
    }

    pub fn next_round(&self) -> Self {
        Self {
            nonce: self.nonce.wrapping_add(1),
            ..self.clone()
        }
    }
}
