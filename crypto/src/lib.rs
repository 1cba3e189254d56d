pub mod codec;
pub mod error;
pub mod keys;

pub use codec::TokenCodec;
pub use error::{CryptoError, CryptoResult};
pub use keys::{JsonWebKey, JwksResponse, SigningMaterial};
