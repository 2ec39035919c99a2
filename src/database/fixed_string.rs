//! # Fixed-Width String Module
//!
//! A normalizing container for exactly `N` bytes of text. Used both for field
//! and attribute names (`N = 8`) and for the 16-character text attribute
//! (`N = 16`). No length prefix is ever written to disk for a `FixedString`;
//! its width is always known from the schema that contains it.
//!
//! #### Authorship
//!
//! - Max Fierro, 2/24/2024 (maxfierro@berkeley.edu)

use std::{
    fmt,
    io::{self, Read, Write},
};

/* DEFINITION */

/// Exactly `N` bytes of space-padded text. Construction truncates longer
/// input to `N` bytes; shorter input is right-padded with ASCII space
/// (`0x20`). Equality, ordering, and hashing all operate on this normalized
/// form, which is also what makes a `BTreeMap<FixedString<8>, _>` iterate in
/// the padded-name lexicographic order the wire format relies on.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedString<const N: usize> {
    bytes: [u8; N],
}

/* IMPLEMENTATION */

impl<const N: usize> FixedString<N> {
    /// Builds a padded `FixedString` from arbitrary text, truncating to `N`
    /// bytes and padding the remainder with ASCII spaces.
    pub fn new(text: &str) -> Self {
        let mut bytes = [b' '; N];
        let src = text.as_bytes();
        let len = src.len().min(N);
        bytes[..len].copy_from_slice(&src[..len]);
        Self { bytes }
    }

    /// The fixed width of this string, in bytes.
    pub const fn width() -> usize {
        N
    }

    /// The normalized (padded) byte representation.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// The normalized form as a lossily-decoded string, spaces and all.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Reads `N` bytes from `source` and wraps them without re-normalizing;
    /// the bytes on disk are assumed to already be padded correctly.
    pub fn read_from<R: Read>(source: &mut R) -> io::Result<Self> {
        let mut bytes = [0u8; N];
        source.read_exact(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Writes the normalized `N` bytes to `sink`.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(&self.bytes)
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self { bytes: [b' '; N] }
    }
}

impl<const N: usize> From<&str> for FixedString<N> {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedString<{N}>({:?})", self.as_str())
    }
}

/* UNIT TESTING */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_input() {
        let s: FixedString<8> = FixedString::new("id");
        assert_eq!(s.as_bytes(), b"id      ");
    }

    #[test]
    fn truncates_long_input() {
        let s: FixedString<8> = FixedString::new("StudentIdentification");
        assert_eq!(s.as_bytes(), b"StudentI");
    }

    #[test]
    fn equal_after_normalization() {
        let a: FixedString<8> = FixedString::new("StudentIdentification");
        let b: FixedString<8> = FixedString::new("StudentI");
        assert_eq!(a, b);
    }

    #[test]
    fn round_trips_through_stream() {
        let s: FixedString<16> = FixedString::new("Josh");
        let mut buf = Vec::new();
        s.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 16);
        let mut cursor = &buf[..];
        let parsed: FixedString<16> = FixedString::read_from(&mut cursor).unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn orders_lexicographically_on_padded_bytes() {
        let a: FixedString<8> = FixedString::new("Deadlift");
        let b: FixedString<8> = FixedString::new("Squat");
        let id: FixedString<8> = FixedString::new("id");
        assert!(a < b);
        assert!(b < id);
    }
}
