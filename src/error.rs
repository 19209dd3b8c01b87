use ark_serialize::SerializationError;

#[derive(Debug)]
pub enum SigmaError {
    /// A point or scalar could not be encoded or failed validation while decoding
    Serialization(SerializationError),
    /// Limb width must be in `1..=64` bits
    InvalidLimbSize(u32),
    /// Decrypted limb at this index is not below the allowed bound
    LimbOutOfRange(usize),
    /// Decrypted value is larger than the given bound
    PlaintextOutOfRange(u64),
    /// Decryption bound is too large to search for the plaintext
    DecryptionBoundTooLarge(u64),
    ZeroSecretKey,
}

impl From<SerializationError> for SigmaError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}
