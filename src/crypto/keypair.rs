//! Ed25519 keypair generation.

use ed25519_dalek::SigningKey;
use rand::{CryptoRng, RngCore};

/// An Ed25519 keypair as used by Solana wallets.
#[derive(Debug, Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generates a new random keypair from the given CSPRNG.
    #[inline]
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            signing_key: SigningKey::generate(rng),
        }
    }

    /// Rebuilds a keypair from its 32-byte secret seed.
    pub fn from_secret_key(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Returns the raw 32-byte public key.
    #[inline]
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Returns the public key rendered as a base58 address.
    #[inline]
    pub fn address(&self) -> String {
        bs58::encode(self.public_key_bytes()).into_string()
    }

    /// Returns the 64-byte secret key: the 32-byte seed followed by the public key.
    ///
    /// This is the layout Solana keypair files and wallets expect.
    pub fn secret_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }
}
