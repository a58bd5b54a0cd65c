//! Embedding blob encoding.

/// Encode floats as concatenated 4-byte native-endian IEEE-754 values, the
/// layout consumers of the embedding table decode. Output length is exactly
/// `4 * values.len()`.
///
/// Pass the result to [`Sist2Index::upsert_embedding`].
///
/// [`Sist2Index::upsert_embedding`]: crate::Sist2Index::upsert_embedding
pub fn serialize_float_array(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for value in values {
        bytes.extend_from_slice(&value.to_ne_bytes());
    }
    bytes
}
