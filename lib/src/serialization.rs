//! Serialization of fitted state.
//!
//! Fitted transformers, fitted estimators and the model artifact are plain
//! data (vectors, maps, scalars), so a single bincode blanket impl covers them
//! all.

use std::error::Error;

/// A trait for fitted state that can be serialized to and from bytes.
///
/// Implementors should contain only plain data (e.g., `Vec<f64>`,
/// `BTreeMap<String, f64>`), never file handles or thread pools.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}
