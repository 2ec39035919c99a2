//! # Attribute Module
//!
//! Typed payload cells that make up a [`crate::database::Record`]: an
//! identifier, a signed integer, an IEEE-754 single-precision float, or a
//! 16-byte fixed string. Unlike [`crate::database::Field`], which describes
//! a schema *column*, an `Attribute` carries the *value* stored in one
//! record's cell for that column.
//!
//! #### Authorship
//!
//! - Max Fierro, 2/24/2024 (maxfierro@berkeley.edu)

use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

use crate::database::field::FieldType;
use crate::database::fixed_string::FixedString;

/// The sentinel identifier value marking a tombstoned slot.
pub const TOMBSTONE_ID: u32 = 0;

/// A tagged record cell. The identifier variant reserves `0` as the deletion
/// marker; assigned identifiers start at 1 and increase monotonically as
/// records are inserted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attribute {
    Identifier(u32),
    Integer(i32),
    Floating(f32),
    Text16(FixedString<16>),
}

impl Attribute {
    /// The schema type tag this cell corresponds to.
    pub fn field_type(&self) -> FieldType {
        match self {
            Attribute::Identifier(_) => FieldType::Id,
            Attribute::Integer(_) => FieldType::Int,
            Attribute::Floating(_) => FieldType::Float,
            Attribute::Text16(_) => FieldType::Text16,
        }
    }

    /// The number of value bytes (excluding the 8-byte name) this cell
    /// occupies on disk.
    pub fn get_size(&self) -> usize {
        self.field_type().value_size()
    }

    /// Emits only the value bytes of this cell; the caller is responsible
    /// for writing the preceding 8-byte padded name.
    pub fn write_value<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        match self {
            Attribute::Identifier(id) => sink.write_u32::<LE>(*id),
            Attribute::Integer(v) => sink.write_i32::<LE>(*v),
            Attribute::Floating(v) => sink.write_f32::<LE>(*v),
            Attribute::Text16(text) => text.write_to(sink),
        }
    }

    /// Reads only the value bytes for a cell of the given type; the caller
    /// is responsible for having already consumed the 8-byte padded name.
    pub fn read_value<R: Read>(source: &mut R, ty: FieldType) -> io::Result<Self> {
        Ok(match ty {
            FieldType::Id => Attribute::Identifier(source.read_u32::<LE>()?),
            FieldType::Int => Attribute::Integer(source.read_i32::<LE>()?),
            FieldType::Float => Attribute::Floating(source.read_f32::<LE>()?),
            FieldType::Text16 => Attribute::Text16(FixedString::read_from(source)?),
        })
    }
}

/* UNIT TESTING */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_round_trips() {
        let attr = Attribute::Identifier(42);
        let mut buf = Vec::new();
        attr.write_value(&mut buf).unwrap();
        assert_eq!(buf.len(), 4);
        let mut cursor = &buf[..];
        let parsed = Attribute::read_value(&mut cursor, FieldType::Id).unwrap();
        assert_eq!(parsed, attr);
    }

    #[test]
    fn floating_round_trips_bitwise() {
        let attr = Attribute::Floating(235.72);
        let mut buf = Vec::new();
        attr.write_value(&mut buf).unwrap();
        let mut cursor = &buf[..];
        let parsed = Attribute::read_value(&mut cursor, FieldType::Float).unwrap();
        assert_eq!(parsed, attr);
    }

    #[test]
    fn text16_pads_and_round_trips() {
        let attr = Attribute::Text16(FixedString::new("Josh"));
        let mut buf = Vec::new();
        attr.write_value(&mut buf).unwrap();
        assert_eq!(buf.len(), 16);
        assert_eq!(&buf, b"Josh            ");
    }
}
