//! Cryptographic core for Courier.
//!
//! Provides the envelope protocol two principals use to exchange messages
//! through a relay they do not trust with content:
//! - X25519 + Ed25519 identity key pairs
//! - ChaCha20-Poly1305 per-message content encryption
//! - X25519/XSalsa20-Poly1305 wrapping of the content key per reader
//! - Ed25519 signatures over the plaintext
//!
//! # Architecture
//!
//! Sending a message produces one ciphertext and one wrapped content key for
//! each reader (the sender and the recipient):
//!
//! 1. **Content Key**: random, one per message, zeroized on drop. Never
//!    stored or transmitted in the clear.
//!
//! 2. **Wrapped Key**: the content key sealed to one reader's public key with
//!    an ephemeral X25519 secret. Either reader opens their own blob with
//!    their own private key only.
//!
//! Private keys are never held by this crate beyond a single call: every
//! operation that needs one borrows a caller-owned [`PrivateKey`].

mod cipher;
pub mod encoding;
pub mod envelope;
mod error;
pub mod keypair;
pub mod signature;
mod wrap;

pub use cipher::{CONTENT_KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use envelope::{Envelope, EnvelopeScheme, Reader, ReaderKey, unwrap, wrap_for_recipients};
pub use error::{CryptoError, CryptoResult};
pub use keypair::{KeyPair, PrivateKey, PublicKey, generate_keypair};
pub use signature::{SIGNATURE_SIZE, sign, verify};
pub use wrap::{WRAPPED_KEY_LEN, WrappedKey};
