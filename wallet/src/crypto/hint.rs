//! Signature hints.
//!
//! Every signature attached to a transaction carries a 4-byte hint: the last
//! four bytes of the signer's raw public key. It lets a validator find the
//! right key in O(1) before paying for a full Ed25519 verification.
//!
//! A hint has 2^32 possible values, so collisions are possible. Anything
//! here answers "could this key have produced the signature", never "did it".

use serde::{Deserialize, Serialize};

use super::keys::{Keypair, PublicKey, Signature};

/// Hint length in bytes.
pub const HINT_LENGTH: usize = 4;

/// Last four raw bytes of a public key.
pub type SignatureHint = [u8; HINT_LENGTH];

/// Computes the hint for a public key.
pub fn hint_for(public_key: &PublicKey) -> SignatureHint {
    let bytes = public_key.as_bytes();
    let mut hint = [0u8; HINT_LENGTH];
    hint.copy_from_slice(&bytes[bytes.len() - HINT_LENGTH..]);
    hint
}

/// A signature as attached to a transaction envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratedSignature {
    /// Fingerprint of the (claimed) signer key.
    #[serde(with = "hint_hex")]
    pub hint: SignatureHint,
    /// Raw Ed25519 signature over the transaction hash.
    pub signature: Signature,
}

impl DecoratedSignature {
    /// Sign `message` and decorate the result with the signer's hint.
    pub fn sign(keypair: &Keypair, message: &[u8]) -> Self {
        Self {
            hint: hint_for(&keypair.public_key()),
            signature: keypair.sign(message),
        }
    }

    /// `true` if the hint is consistent with `public_key`.
    pub fn hint_matches(&self, public_key: &PublicKey) -> bool {
        self.hint == hint_for(public_key)
    }

    /// Hint match plus full Ed25519 verification over `message`.
    pub fn verifies_for(&self, public_key: &PublicKey, message: &[u8]) -> bool {
        self.hint_matches(public_key) && public_key.verify(message, &self.signature)
    }
}

mod hint_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{SignatureHint, HINT_LENGTH};

    pub fn serialize<S: Serializer>(hint: &SignatureHint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hint))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SignatureHint, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(serde::de::Error::custom)?;
        bytes.as_slice().try_into().map_err(|_| {
            serde::de::Error::custom(format!("hint must be {} bytes", HINT_LENGTH))
        })
    }
}
