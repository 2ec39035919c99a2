//! # Field Module
//!
//! A single schema column: a padded 8-byte name and a type tag. Fields are
//! the unit the [`crate::database::Table`] header is built out of.
//!
//! #### Authorship
//!
//! - Max Fierro, 2/24/2024 (maxfierro@berkeley.edu)

use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

use crate::database::fixed_string::FixedString;

/* CONSTANTS */

/// The serialized size (in bytes) of a [`Field`] in the current format: an
/// 8-byte padded name plus a 4-byte type tag.
pub const FIELD_HEADER_SIZE: u32 = 12;

/// The padded name reserved for the synthetic identifier field every
/// [`crate::database::Table`] is given on first write.
pub const ID_FIELD_NAME: &str = "id";

/* TYPE TAG */

/// The type of data stored in a single record cell. Mirrors the type tags
/// persisted in the file header: `id = -1`, `int = 0`, `float = 1`,
/// `text16 = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Id,
    Int,
    Float,
    Text16,
}

impl FieldType {
    /// The discriminant persisted to disk for this type.
    pub const fn tag(self) -> i32 {
        match self {
            FieldType::Id => -1,
            FieldType::Int => 0,
            FieldType::Float => 1,
            FieldType::Text16 => 2,
        }
    }

    /// Coerces any tag to a known variant, falling back to `Int` for unknown
    /// values rather than failing, so a file written by a later format with
    /// an unrecognized tag still loads.
    pub const fn from_tag(tag: i32) -> Self {
        match tag {
            -1 => FieldType::Id,
            1 => FieldType::Float,
            2 => FieldType::Text16,
            _ => FieldType::Int,
        }
    }

    /// The number of value bytes (excluding the 8-byte name) a cell of this
    /// type occupies on disk.
    pub const fn value_size(self) -> usize {
        match self {
            FieldType::Id => 4,
            FieldType::Int => 4,
            FieldType::Float => 4,
            FieldType::Text16 => 16,
        }
    }
}

/* DEFINITION */

/// One schema column. Carries a fixed, padded 8-byte name and a
/// [`FieldType`]. A `Field` loaded from a file written in a later format
/// retains that file's declared `field_size` so the record area can still be
/// parsed once its leading 12 bytes (name + tag) are read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    name: FixedString<8>,
    ty: FieldType,
    field_size: u32,
}

/* IMPLEMENTATION */

impl Field {
    /// Builds a new field with the current format's `field_size`.
    pub fn new(name: &str, ty: FieldType) -> Self {
        Self {
            name: FixedString::new(name),
            ty,
            field_size: FIELD_HEADER_SIZE,
        }
    }

    /// Builds the synthetic identifier field.
    pub fn id_field() -> Self {
        Self::new(ID_FIELD_NAME, FieldType::Id)
    }

    pub fn name(&self) -> FixedString<8> {
        self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.ty
    }

    /// Sets this field's type, coercing unknown tags to `Int`.
    pub fn set_type(&mut self, tag: i32) {
        self.ty = FieldType::from_tag(tag);
    }

    /// The serialized size of this field's header entry as declared by the
    /// table it was read from (12 for the current format, possibly larger
    /// for a future one).
    pub fn get_size(&self) -> u32 {
        self.field_size
    }

    /// Emits the padded name followed by the 4-byte type tag. Always writes
    /// exactly [`FIELD_HEADER_SIZE`] bytes, regardless of what `field_size`
    /// this field happens to remember.
    pub fn write<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        self.name.write_to(sink)?;
        sink.write_i32::<LE>(self.ty.tag())
    }

    /// Reads a field assuming the table-wide declared `field_size`. Any
    /// bytes beyond the 12-byte name+tag header are skipped, which is what
    /// lets a table written by a later format (with extra per-field bytes)
    /// still be read by this implementation.
    pub fn read<R: Read>(source: &mut R, field_size: u32) -> io::Result<Self> {
        let name = FixedString::read_from(source)?;
        let tag = source.read_i32::<LE>()?;
        if field_size > FIELD_HEADER_SIZE {
            let mut padding = vec![0u8; (field_size - FIELD_HEADER_SIZE) as usize];
            source.read_exact(&mut padding)?;
        }
        Ok(Self {
            name,
            ty: FieldType::from_tag(tag),
            field_size,
        })
    }
}

/* UNIT TESTING */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let field = Field::new("Squat", FieldType::Int);
        let mut buf = Vec::new();
        field.write(&mut buf).unwrap();
        assert_eq!(buf.len(), FIELD_HEADER_SIZE as usize);

        let mut cursor = &buf[..];
        let parsed = Field::read(&mut cursor, FIELD_HEADER_SIZE).unwrap();
        assert_eq!(parsed.name(), field.name());
        assert_eq!(parsed.field_type(), FieldType::Int);
    }

    #[test]
    fn tolerates_trailing_bytes_from_a_later_format() {
        let field = Field::new("Wilks", FieldType::Float);
        let mut buf = Vec::new();
        field.write(&mut buf).unwrap();
        buf.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);

        let mut cursor = &buf[..];
        let parsed = Field::read(&mut cursor, 16).unwrap();
        assert_eq!(parsed.field_type(), FieldType::Float);
        assert_eq!(parsed.get_size(), 16);
    }

    #[test]
    fn unknown_tag_falls_back_to_int() {
        let mut field = Field::new("x", FieldType::Float);
        field.set_type(99);
        assert_eq!(field.field_type(), FieldType::Int);
    }
}
