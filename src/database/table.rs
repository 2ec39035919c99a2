//! # Table Module
//!
//! This module provides the implementation of a database table that can be
//! used to encapsulate related data under a single record schema. A `Table`
//! is a mapping from padded field name to [`Field`], iterated in
//! padded-name lexicographic order so that writing and reading a schema
//! always produce the same byte sequence.
//!
//! #### Authorship
//!
//! - Max Fierro, 2/24/2024 (maxfierro@berkeley.edu)

use std::collections::BTreeMap;
use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

use crate::database::error::{Result, StoreError};
use crate::database::field::{Field, FieldType, FIELD_HEADER_SIZE, ID_FIELD_NAME};
use crate::database::fixed_string::FixedString;

/* DEFINITION */

/// An ordered set of [`Field`]s keyed by padded name. Equality is by field
/// set; iteration is always in padded-name lexicographic order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    fields: BTreeMap<FixedString<8>, Field>,
}

/* IMPLEMENTATION */

impl Table {
    /// Builds an empty table. No fields, including the synthetic identifier
    /// field, are present until [`Table::add_field`] or [`Table::write`] add
    /// them.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a field under its padded name. Does not assign
    /// the synthetic `id` field -- that only happens on write.
    pub fn add_field(&mut self, name: &str, ty: FieldType) {
        let field = Field::new(name, ty);
        self.fields.insert(field.name(), field);
    }

    /// True iff `name`, once padded, names a field in this table.
    pub fn is_field(&self, name: &str) -> bool {
        self.fields
            .contains_key(&FixedString::new(name))
    }

    /// Looks up a field by (unpadded or padded) name.
    pub fn field_for(&self, name: &str) -> Option<&Field> {
        self.fields.get(&FixedString::new(name))
    }

    /// A snapshot of this table's fields, in padded-name lexicographic
    /// order.
    pub fn get_fields(&self) -> BTreeMap<FixedString<8>, Field> {
        self.fields.clone()
    }

    /// Iterates over this table's fields in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (&FixedString<8>, &Field)> {
        self.fields.iter()
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// The number of bytes occupied by this table's header once written:
    /// `8 + num_fields * FIELD_HEADER_SIZE`. Only meaningful after the
    /// synthetic `id` field has been injected (i.e. after a [`Table::write`]
    /// or [`Table::read`]).
    pub fn header_size(&self) -> u64 {
        8 + self.fields.len() as u64 * FIELD_HEADER_SIZE as u64
    }

    /// The byte offset, within a sanitized record slot, where the identifier
    /// cell begins (its padded name, followed immediately by its 4-byte
    /// value). Because cells are written in padded-name lexicographic order,
    /// this is not always zero. Used by the engine to tombstone a slot by
    /// overwriting only its identifier cell in place.
    pub fn id_cell_offset(&self) -> u64 {
        let mut offset = 0u64;
        for field in self.fields.values() {
            if field.field_type() == FieldType::Id {
                return offset;
            }
            offset += 8 + field.field_type().value_size() as u64;
        }
        0
    }

    /// Writes the table header: if the table is empty, this is a no-op (an
    /// empty table declares no schema at all). Otherwise the synthetic `id`
    /// field is injected into this table's own field map if absent -- from
    /// then on it is part of the schema -- followed by `num_fields`,
    /// `field_size`, and each field in padded-name order.
    pub fn write<W: Write>(&mut self, sink: &mut W) -> io::Result<()> {
        if self.fields.is_empty() {
            return Ok(());
        }
        self.fields
            .entry(FixedString::new(ID_FIELD_NAME))
            .or_insert_with(Field::id_field);

        sink.write_i32::<LE>(self.fields.len() as i32)?;
        sink.write_u32::<LE>(FIELD_HEADER_SIZE)?;
        for field in self.fields.values() {
            field.write(sink)?;
        }
        Ok(())
    }

    /// Reads a table header: `num_fields`, `field_size`, then `num_fields`
    /// fields, each tolerant of a `field_size` larger than the current
    /// format's 12 bytes.
    pub fn read<R: Read>(source: &mut R) -> Result<Self> {
        let num_fields = source.read_i32::<LE>()?;
        if num_fields < 0 {
            return Err(StoreError::Corrupt {
                reason: format!("negative num_fields ({num_fields})"),
            });
        }
        let field_size = source.read_u32::<LE>()?;
        if field_size < FIELD_HEADER_SIZE {
            return Err(StoreError::Corrupt {
                reason: format!(
                    "field_size {field_size} is smaller than the minimum {FIELD_HEADER_SIZE}"
                ),
            });
        }

        let mut fields = BTreeMap::new();
        for _ in 0..num_fields {
            let field = Field::read(source, field_size)?;
            fields.insert(field.name(), field);
        }
        Ok(Self { fields })
    }
}

/* UNIT TESTING */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_write_is_a_no_op() {
        let mut table = Table::new();
        let mut buf = Vec::new();
        table.write(&mut buf).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn write_injects_id_field() {
        let mut table = Table::new();
        table.add_field("Squat", FieldType::Int);
        let mut buf = Vec::new();
        table.write(&mut buf).unwrap();
        assert!(table.is_field("id"));
        assert_eq!(table.num_fields(), 2);
    }

    #[test]
    fn round_trips_through_stream() {
        let mut table = Table::new();
        table.add_field("Squat", FieldType::Int);
        table.add_field("Wilks", FieldType::Float);
        table.add_field("Name", FieldType::Text16);
        let mut buf = Vec::new();
        table.write(&mut buf).unwrap();

        let mut cursor = &buf[..];
        let parsed = Table::read(&mut cursor).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn name_truncation_is_transparent_to_lookups() {
        let mut table = Table::new();
        table.add_field("StudentIdentification", FieldType::Int);
        assert!(table.is_field("StudentI"));
        assert!(table.is_field("StudentIdentification"));
    }

    #[test]
    fn id_cell_offset_accounts_for_preceding_fields() {
        let mut table = Table::new();
        table.add_field("Squat", FieldType::Int);
        let mut buf = Vec::new();
        table.write(&mut buf).unwrap();

        // "Squat" < "id" lexicographically, so the id cell is not first.
        assert_eq!(table.id_cell_offset(), 8 + FieldType::Int.value_size() as u64);
    }

    #[test]
    fn iteration_is_padded_name_lexicographic() {
        let mut table = Table::new();
        table.add_field("Squat", FieldType::Int);
        table.add_field("Deadlift", FieldType::Int);
        table.add_field("Press", FieldType::Int);
        let mut buf = Vec::new();
        table.write(&mut buf).unwrap();

        let names: Vec<String> = table
            .iter()
            .map(|(name, _)| name.as_str().trim_end().to_owned())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
