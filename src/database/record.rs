//! # Record Module
//!
//! A single row: an identifier cell plus named attribute cells, validated
//! against a [`Table`]. Not every table field needs to be present when a
//! client builds a record -- [`Record::sanitize`] fills in type-appropriate
//! zeros for whatever is missing before the record is measured or written.
//!
//! #### Authorship
//!
//! - Max Fierro, 11/4/2023 (maxfierro@berkeley.edu)

use std::collections::BTreeMap;
use std::io::{self, Read, Write};

use crate::database::attribute::{Attribute, TOMBSTONE_ID};
use crate::database::error::StoreError;
use crate::database::field::FieldType;
use crate::database::fixed_string::FixedString;
use crate::database::table::Table;

/* DEFINITION */

/// A fixed-length contiguous list of named cells, bound to an owned copy of
/// the [`Table`] that gives them meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    table: Table,
    id: u32,
    ints: BTreeMap<FixedString<8>, i32>,
    floats: BTreeMap<FixedString<8>, f32>,
    text16s: BTreeMap<FixedString<8>, FixedString<16>>,
}

/* IMPLEMENTATION */

impl Record {
    /// Builds an empty record bound to a clone of `table`. The identifier
    /// starts at 0, the tombstone value, until [`Record::set_id`] is called
    /// (normally by [`crate::database::Database::insert`]).
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            id: TOMBSTONE_ID,
            ints: BTreeMap::new(),
            floats: BTreeMap::new(),
            text16s: BTreeMap::new(),
        }
    }

    /// Rebinds this record to a different table, used by the engine to
    /// enforce that its own schema is authoritative before a write or read.
    pub fn set_table(&mut self, table: &Table) {
        self.table = table.clone();
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn get_id(&self) -> u32 {
        self.id
    }

    /// Stores `v` under `name` if, once padded, it names a field in this
    /// record's table; otherwise does nothing.
    pub fn add_int(&mut self, name: &str, v: i32) {
        let key = FixedString::new(name);
        if self.table.is_field(name) {
            self.ints.insert(key, v);
        }
    }

    pub fn add_float(&mut self, name: &str, v: f32) {
        let key = FixedString::new(name);
        if self.table.is_field(name) {
            self.floats.insert(key, v);
        }
    }

    pub fn add_char16(&mut self, name: &str, v: &str) {
        let key = FixedString::new(name);
        if self.table.is_field(name) {
            self.text16s
                .insert(key, FixedString::new(v));
        }
    }

    pub fn get_int(&self, name: &str) -> i32 {
        self.ints
            .get(&FixedString::new(name))
            .copied()
            .unwrap_or(0)
    }

    pub fn get_float(&self, name: &str) -> f32 {
        self.floats
            .get(&FixedString::new(name))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn get_char16(&self, name: &str) -> String {
        self.text16s
            .get(&FixedString::new(name))
            .map(|s| s.as_str().into_owned())
            .unwrap_or_else(|| FixedString::<16>::default().as_str().into_owned())
    }

    /// Ensures every table field of type int/float/text16 has a
    /// corresponding cell, creating a zero cell (0, 0.0, or 16 spaces) for
    /// whichever are missing. Does not touch the identifier cell.
    pub fn sanitize(&mut self) {
        for (name, field) in self.table.iter() {
            match field.field_type() {
                FieldType::Int => {
                    self.ints.entry(*name).or_insert(0);
                }
                FieldType::Float => {
                    self.floats.entry(*name).or_insert(0.0);
                }
                FieldType::Text16 => {
                    self.text16s
                        .entry(*name)
                        .or_insert_with(FixedString::default);
                }
                FieldType::Id => {}
            }
        }
    }

    /// The sum of `name_size + value_size` over the identifier and every
    /// currently stored cell. After [`Record::sanitize`], this equals the
    /// engine's `record_size` for the bound table.
    pub fn get_size(&self) -> usize {
        let id_size = 8 + Attribute::Identifier(self.id).get_size();
        let int_size: usize = self
            .ints
            .len()
            * (8 + FieldType::Int.value_size());
        let float_size: usize = self
            .floats
            .len()
            * (8 + FieldType::Float.value_size());
        let text_size: usize = self
            .text16s
            .len()
            * (8 + FieldType::Text16.value_size());
        id_size + int_size + float_size + text_size
    }

    /// Writes this record's cells in the table's own field-iteration order
    /// (padded-name lexicographic), identical to [`Record::read`]'s order.
    /// Callers normally [`Record::sanitize`] before writing so that every
    /// table field is represented.
    pub fn write<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for (name, field) in self.table.iter() {
            let attribute = self.attribute_for(name, field.field_type());
            name.write_to(sink)?;
            attribute.write_value(sink)?;
        }
        Ok(())
    }

    /// Reads a record bound to `table`, driven by the table's field order:
    /// for each field, an 8-byte padded name is consumed and compared
    /// against the expected field name before the value bytes are
    /// interpreted according to that field's type. A mismatch indicates a
    /// corrupt file.
    pub fn read<R: Read>(source: &mut R, table: &Table) -> Result<Self, StoreError> {
        let mut record = Record::new(table);
        for (expected_name, field) in table.iter() {
            let name = FixedString::<8>::read_from(source)?;
            if &name != expected_name {
                return Err(StoreError::Corrupt {
                    reason: format!(
                        "expected field '{}' but found '{}' while decoding a record",
                        expected_name.as_str(),
                        name.as_str()
                    ),
                });
            }
            let attribute = Attribute::read_value(source, field.field_type())?;
            record.store(*expected_name, attribute);
        }
        Ok(record)
    }

    fn attribute_for(&self, name: &FixedString<8>, ty: FieldType) -> Attribute {
        match ty {
            FieldType::Id => Attribute::Identifier(self.id),
            FieldType::Int => {
                Attribute::Integer(self.ints.get(name).copied().unwrap_or(0))
            }
            FieldType::Float => {
                Attribute::Floating(self.floats.get(name).copied().unwrap_or(0.0))
            }
            FieldType::Text16 => Attribute::Text16(
                self.text16s
                    .get(name)
                    .copied()
                    .unwrap_or_default(),
            ),
        }
    }

    fn store(&mut self, name: FixedString<8>, attribute: Attribute) {
        match attribute {
            Attribute::Identifier(id) => self.id = id,
            Attribute::Integer(v) => {
                self.ints.insert(name, v);
            }
            Attribute::Floating(v) => {
                self.floats.insert(name, v);
            }
            Attribute::Text16(v) => {
                self.text16s.insert(name, v);
            }
        }
    }
}

/* UNIT TESTING */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::field::FieldType;

    fn sample_table() -> Table {
        let mut table = Table::new();
        table.add_field("Name", FieldType::Text16);
        table.add_field("Squat", FieldType::Int);
        table.add_field("Wilks", FieldType::Float);
        let mut buf = Vec::new();
        table.write(&mut buf).unwrap();
        table
    }

    #[test]
    fn sanitize_fills_missing_cells_with_zeros() {
        let table = sample_table();
        let mut record = Record::new(&table);
        record.add_int("Squat", 245);
        record.sanitize();
        assert_eq!(record.get_int("Squat"), 245);
        assert_eq!(record.get_float("Wilks"), 0.0);
        assert_eq!(record.get_char16("Name"), " ".repeat(16));
    }

    #[test]
    fn add_rejects_unknown_field_silently() {
        let table = sample_table();
        let mut record = Record::new(&table);
        record.add_int("Deadlift", 999);
        assert_eq!(record.get_int("Deadlift"), 0);
    }

    #[test]
    fn round_trip_preserves_sanitized_cells() {
        let table = sample_table();
        let mut record = Record::new(&table);
        record.set_id(1);
        record.add_char16("Name", "Josh");
        record.add_int("Squat", 245);
        record.sanitize();

        let mut buf = Vec::new();
        record.write(&mut buf).unwrap();
        assert_eq!(buf.len(), record.get_size());

        let mut cursor = &buf[..];
        let parsed = Record::read(&mut cursor, &table).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn name_truncation_matches_at_lookup() {
        let mut table = Table::new();
        table.add_field("StudentIdentification", FieldType::Int);
        let mut buf = Vec::new();
        table.write(&mut buf).unwrap();

        let mut record = Record::new(&table);
        record.add_int("StudentIdentification", 7);
        assert_eq!(record.get_int("StudentI"), 7);
    }
}
