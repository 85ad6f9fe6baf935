//! # Nibbles: Half-byte path representation
//!
//! Hashed addresses are expanded into nibbles (half-bytes, 0-15) to form the
//! trie's branching key. A 32-byte hash becomes 64 nibbles. Trie-node bucket
//! keys store one nibble per byte; hashed-account bucket keys are the packed
//! byte form, so prefixes must be compressed back before scanning.

/// Nibble path: one nibble (0..=15) per element.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Nibbles(pub Vec<u8>);

impl Nibbles {
    /// Expand arbitrary bytes into nibbles (used for hashed addresses).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut nibbles = Vec::with_capacity(bytes.len() * 2);
        for byte in bytes {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0F);
        }
        Nibbles(nibbles)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get nibble at index.
    pub fn at(&self, index: usize) -> u8 {
        self.0[index]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Whether `prefix` is a leading segment of this path.
    pub fn starts_with(&self, prefix: &Nibbles) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Pack nibbles two per byte, padding an odd tail with a zero nibble.
    ///
    /// Returns the packed bytes together with the number of significant
    /// bits (4 per nibble) - the pad nibble carries no information and the
    /// bit count excludes it, which is exactly what a prefix-bounded range
    /// scan needs.
    pub fn compress(&self) -> (Vec<u8>, usize) {
        let fixed_bits = self.0.len() * 4;
        let mut out = Vec::with_capacity(self.0.len().div_ceil(2));
        for chunk in self.0.chunks(2) {
            let hi = chunk[0] << 4;
            let lo = chunk.get(1).copied().unwrap_or(0);
            out.push(hi | lo);
        }
        (out, fixed_bits)
    }
}

/// Whether `key` shares its first `bits` bits with `start`.
///
/// Used by range-scan implementations to bound a walk to a subtree: the
/// scan stops at the first key past the prefix boundary. Overrunning the
/// boundary would let the caller claim "loaded" for sibling subtrees.
pub fn bit_prefix_matches(key: &[u8], start: &[u8], bits: usize) -> bool {
    if bits == 0 {
        return true;
    }
    let full = bits / 8;
    let rem = bits % 8;
    let need = full + usize::from(rem > 0);
    if key.len() < need || start.len() < need {
        return false;
    }
    if key[..full] != start[..full] {
        return false;
    }
    if rem == 0 {
        return true;
    }
    let mask = 0xFFu8 << (8 - rem);
    (key[full] & mask) == (start[full] & mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibbles_from_bytes() {
        let nibbles = Nibbles::from_bytes(&[0xAB, 0xCD]);
        assert_eq!(nibbles.0, vec![0x0A, 0x0B, 0x0C, 0x0D]);
        assert_eq!(nibbles.len(), 4);
        assert_eq!(nibbles.at(2), 0x0C);
    }

    #[test]
    fn test_compress_even() {
        let (bytes, bits) = Nibbles(vec![0x0F, 0x00, 0x0A, 0x09]).compress();
        assert_eq!(bytes, vec![0xF0, 0xA9]);
        assert_eq!(bits, 16);
    }

    #[test]
    fn test_compress_odd_pads_with_zero() {
        let (bytes, bits) = Nibbles(vec![0x0F, 0x00, 0x0A]).compress();
        assert_eq!(bytes, vec![0xF0, 0xA0]);
        assert_eq!(bits, 12);
    }

    #[test]
    fn test_starts_with() {
        let path = Nibbles(vec![0x0A, 0x01, 0x0B, 0x02]);
        assert!(path.starts_with(&Nibbles(vec![0x0A, 0x01])));
        assert!(!path.starts_with(&Nibbles(vec![0x0A, 0x02])));
    }

    #[test]
    fn test_bit_prefix_matches_full_bytes() {
        assert!(bit_prefix_matches(&[0xF0, 0xA9, 0x33], &[0xF0, 0xA9], 16));
        assert!(!bit_prefix_matches(&[0xF0, 0xAA], &[0xF0, 0xA9], 16));
    }

    #[test]
    fn test_bit_prefix_matches_partial_byte() {
        // 12 bits: the low nibble of the second byte is ignored.
        assert!(bit_prefix_matches(&[0xF0, 0xA9], &[0xF0, 0xA0], 12));
        assert!(!bit_prefix_matches(&[0xF0, 0xB9], &[0xF0, 0xA0], 12));
        // 4 bits: only the top nibble matters.
        assert!(bit_prefix_matches(&[0xF7, 0xFF], &[0xF0], 4));
        assert!(!bit_prefix_matches(&[0xE7], &[0xF0], 4));
    }

    #[test]
    fn test_bit_prefix_matches_short_key() {
        assert!(!bit_prefix_matches(&[0xF0], &[0xF0, 0xA0], 12));
        assert!(bit_prefix_matches(&[], &[], 0));
    }
}
