//! # Database Engine Module
//!
//! The file-backed engine: lifecycle (`create`/`load`), mutation
//! (`insert`/`update`/`remove`), linear search, and threshold-triggered
//! compaction. Every public method opens its own file handle, performs its
//! I/O, and releases the handle before returning -- there is no long-lived
//! handle shared across calls, and no locking, since the store is meant to be
//! driven by a single logical caller at a time.
//!
//! #### Authorship
//!
//! - Max Fierro, 2/24/2024 (maxfierro@berkeley.edu)

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::path::PathBuf;

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

use crate::database::attribute::TOMBSTONE_ID;
use crate::database::error::{Result, StoreError};
use crate::database::field::FieldType;
use crate::database::fixed_string::FixedString;
use crate::database::record::Record;
use crate::database::table::Table;

/* CONSTANTS */

/// Denominator of the tombstone-fraction threshold that triggers
/// compaction: a file compacts once `removed_count / record_count >= 1 /
/// REMOVED_THRESHOLD_DENOM`.
const REMOVED_THRESHOLD_DENOM: u32 = 2;

const FILE_EXTENSION: &str = "pb";
const TEMP_EXTENSION: &str = "pb.tmp";

/* DEFINITION */

/// A single-file flat-table record store. The schema, record count, tombstone
/// count, and per-slot record size live in memory once a file has been
/// created or loaded; the on-disk file is the sole source of truth for
/// record contents.
pub struct Database {
    db_name: String,
    table: Table,
    record_count: u32,
    removed_count: u32,
    record_size: Option<i32>,
}

/* IMPLEMENTATION */

impl Database {
    fn path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{FILE_EXTENSION}", self.db_name))
    }

    fn tmp_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{TEMP_EXTENSION}", self.db_name))
    }

    fn slot_offset(&self, id: u32, record_size: i32) -> u64 {
        self.table.header_size() + 8 + record_size as u64 * (id as u64 - 1)
    }

    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    pub fn removed_count(&self) -> u32 {
        self.removed_count
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Truncates (or creates) `<db_name>.pb`, writes `table`'s header (which
    /// injects the synthetic `id` field if absent), and writes a
    /// `record_count` of zero. The written table becomes this engine's
    /// authoritative schema.
    pub fn create(db_name: &str, mut table: Table) -> Result<Self> {
        let db_name = db_name.to_owned();
        let mut file = File::create(format!("{db_name}.{FILE_EXTENSION}"))?;
        table.write(&mut file)?;
        file.write_u32::<LE>(0)?;
        Ok(Self {
            db_name,
            table,
            record_count: 0,
            removed_count: 0,
            record_size: None,
        })
    }

    /// Opens `<db_name>.pb` for reading, reconstructs its schema and
    /// metadata, and fully decodes every slot once to count tombstones
    /// (since the identifier cell is not guaranteed to be first in the
    /// table's own field order). Records themselves are not retained in
    /// memory afterwards.
    pub fn load(db_name: &str) -> Result<Self> {
        let db_name = db_name.to_owned();
        let mut file = File::open(format!("{db_name}.{FILE_EXTENSION}"))?;
        let table = Table::read(&mut file)?;
        let record_count = file.read_u32::<LE>()?;
        let record_size = file.read_i32::<LE>()?;

        let mut removed_count = 0;
        for _ in 0..record_count {
            let record = Record::read(&mut file, &table)?;
            if record.get_id() == TOMBSTONE_ID {
                removed_count += 1;
            }
        }

        Ok(Self {
            db_name,
            table,
            record_count,
            removed_count,
            record_size: Some(record_size),
        })
    }

    /// Rebinds `record` to this engine's schema, sanitizes it, assigns it
    /// the next identifier, and appends it to the record area, updating the
    /// header's `record_count` and `record_size` first.
    pub fn insert(&mut self, record: &mut Record) -> Result<()> {
        record.set_table(&self.table);
        record.sanitize();

        let new_id = self.record_count + 1;
        record.set_id(new_id);
        let record_size = record.get_size() as i32;

        {
            let mut file = OpenOptions::new()
                .write(true)
                .open(self.path())?;
            file.seek(SeekFrom::Start(self.table.header_size()))?;
            file.write_u32::<LE>(new_id)?;
            file.write_i32::<LE>(record_size)?;
        }
        {
            let mut file = OpenOptions::new()
                .append(true)
                .open(self.path())?;
            record.write(&mut file)?;
        }

        self.record_count = new_id;
        self.record_size = Some(record_size);
        Ok(())
    }

    /// Overwrites the slot for `record`'s identifier in place. Fails with
    /// [`StoreError::NotFound`] if the identifier is zero, exceeds the
    /// current record count, or the slot has already been tombstoned --
    /// unlike the unconditional overwrite this engine's predecessor used to
    /// perform, which could resurrect a tombstoned slot under a new
    /// identity.
    pub fn update(&mut self, record: &Record) -> Result<()> {
        let id = record.get_id();
        if id == 0 || id > self.record_count {
            return Err(StoreError::NotFound { id });
        }
        let record_size = self.record_size.unwrap_or(0);
        let offset = self.slot_offset(id, record_size);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.path())?;
        file.seek(SeekFrom::Start(offset))?;
        let current = Record::read(&mut file, &self.table)?;
        if current.get_id() == TOMBSTONE_ID {
            return Err(StoreError::NotFound { id });
        }

        let mut updated = record.clone();
        updated.set_table(&self.table);
        updated.sanitize();
        updated.set_id(id);

        file.seek(SeekFrom::Start(offset))?;
        updated.write(&mut file)?;
        Ok(())
    }

    /// Linear scan for records whose `name` field equals `value` exactly,
    /// tombstones excluded. Fails with [`StoreError::Schema`] if `name`
    /// (once padded) is not a field of this table, or is not of integer
    /// type.
    pub fn search_int(&self, name: &str, value: i32) -> Result<Vec<Record>> {
        self.verify_field_type(name, FieldType::Int)?;
        self.scan(|record| record.get_int(name) == value)
    }

    /// As [`Database::search_int`], but for floating-point fields. Equality
    /// is exact bitwise comparison; there is no tolerance.
    pub fn search_float(&self, name: &str, value: f32) -> Result<Vec<Record>> {
        self.verify_field_type(name, FieldType::Float)?;
        self.scan(|record| record.get_float(name) == value)
    }

    /// As [`Database::search_int`], but for 16-byte text fields. `value` is
    /// padded the same way a stored cell would be before comparison.
    pub fn search_char16(&self, name: &str, value: &str) -> Result<Vec<Record>> {
        self.verify_field_type(name, FieldType::Text16)?;
        let padded: String = FixedString::<16>::new(value)
            .as_str()
            .into_owned();
        self.scan(|record| record.get_char16(name) == padded)
    }

    fn verify_field_type(&self, name: &str, expected: FieldType) -> Result<()> {
        let field = self.table.field_for(name).ok_or_else(|| {
            StoreError::Schema {
                field: name.to_owned(),
                reason: "no such field in this table".to_owned(),
                candidates: self
                    .table
                    .get_fields()
                    .values()
                    .map(|f| f.name().as_str().trim_end().to_owned())
                    .collect(),
            }
        })?;
        if field.field_type() != expected {
            return Err(StoreError::Schema {
                field: name.to_owned(),
                reason: "field exists but is not of the requested type".to_owned(),
                candidates: Vec::new(),
            });
        }
        Ok(())
    }

    fn scan(&self, predicate: impl Fn(&Record) -> bool) -> Result<Vec<Record>> {
        let mut file = File::open(self.path())?;
        file.seek(SeekFrom::Start(self.table.header_size() + 8))?;
        let mut matches = Vec::new();
        for _ in 0..self.record_count {
            let record = Record::read(&mut file, &self.table)?;
            if record.get_id() != TOMBSTONE_ID && predicate(&record) {
                matches.push(record);
            }
        }
        Ok(matches)
    }

    /// Marks the slot for `id` as a tombstone in place, then compacts the
    /// file if at least half of its slots are now tombstones.
    pub fn remove(&mut self, id: u32) -> Result<()> {
        if id == 0 || id > self.record_count {
            return Err(StoreError::NotFound { id });
        }
        let record_size = self.record_size.unwrap_or(0);
        let offset = self.slot_offset(id, record_size);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.path())?;
        file.seek(SeekFrom::Start(offset))?;
        let current = Record::read(&mut file, &self.table)?;
        if current.get_id() == TOMBSTONE_ID {
            return Err(StoreError::NotFound { id });
        }

        let id_offset = offset + self.table.id_cell_offset() + 8;
        file.seek(SeekFrom::Start(id_offset))?;
        file.write_u32::<LE>(TOMBSTONE_ID)?;
        drop(file);

        self.removed_count += 1;
        if self.removed_count * REMOVED_THRESHOLD_DENOM >= self.record_count {
            self.compact()?;
        }
        Ok(())
    }

    /// Rewrites the file through a temporary shadow file, skipping
    /// tombstones and sliding surviving identifiers down to stay
    /// contiguous, then syncs and atomically renames the shadow file over
    /// the primary. Any `.tmp` file left over from an interrupted prior
    /// compaction is removed first.
    fn compact(&mut self) -> Result<()> {
        let tmp_path = self.tmp_path();
        let _ = fs::remove_file(&tmp_path);

        let record_size = self.record_size.unwrap_or(0);
        let mut schema = self.table.clone();

        let mut tmp = File::create(&tmp_path)?;
        schema.write(&mut tmp)?;
        tmp.write_u32::<LE>(0)?;
        tmp.write_i32::<LE>(record_size)?;

        let mut primary = File::open(self.path())?;
        primary.seek(SeekFrom::Start(self.table.header_size() + 8))?;

        let mut shift: u32 = 0;
        let mut live_count: u32 = 0;
        for _ in 0..self.record_count {
            let mut record = Record::read(&mut primary, &self.table)?;
            if record.get_id() == TOMBSTONE_ID {
                shift += 1;
                continue;
            }
            record.set_id(record.get_id() - shift);
            record.write(&mut tmp)?;
            live_count += 1;
        }

        tmp.seek(SeekFrom::Start(self.table.header_size()))?;
        tmp.write_u32::<LE>(live_count)?;
        tmp.sync_all()?;
        drop(tmp);
        drop(primary);

        fs::remove_file(self.path())?;
        fs::rename(&tmp_path, self.path())?;
        if let Some(dir) = self.path().parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Ok(dir_handle) = File::open(dir) {
                let _ = dir_handle.sync_all();
            }
        }

        self.record_count = live_count;
        self.removed_count = 0;
        Ok(())
    }
}

/* UNIT TESTING */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::field::FieldType;
    use tempfile::TempDir;

    /// Holds the `TempDir` alive for the scratch database's lifetime; the
    /// directory and everything under it are removed on drop.
    struct ScratchDb {
        dir: TempDir,
        name: String,
    }

    impl ScratchDb {
        fn new(label: &str) -> Self {
            let dir = TempDir::new().expect("failed to create scratch directory");
            let name = dir
                .path()
                .join(label)
                .to_string_lossy()
                .into_owned();
            Self { dir, name }
        }
    }

    fn lifting_table() -> Table {
        let mut table = Table::new();
        table.add_field("Name", FieldType::Text16);
        table.add_field("Squat", FieldType::Int);
        table.add_field("Press", FieldType::Int);
        table.add_field("Deadlift", FieldType::Int);
        table.add_field("Wilks", FieldType::Float);
        table
    }

    #[test]
    fn s1_first_insert() {
        let scratch = ScratchDb::new("s1");
        let mut db = Database::create(&scratch.name, lifting_table()).unwrap();

        let mut josh = Record::new(db.table());
        josh.add_char16("Name", "Josh");
        josh.add_int("Squat", 245);
        josh.add_int("Press", 105);
        db.insert(&mut josh).unwrap();

        assert_eq!(db.record_count(), 1);
        assert_eq!(josh.get_id(), 1);
        assert_eq!(josh.get_int("Deadlift"), 0);
        assert_eq!(josh.get_float("Wilks"), 0.0);
        assert_eq!(josh.get_char16("Name"), "Josh".to_owned() + &" ".repeat(12));
    }

    #[test]
    fn s2_through_s3_search_and_update() {
        let scratch = ScratchDb::new("s2s3");
        let mut db = Database::create(&scratch.name, lifting_table()).unwrap();

        let mut josh = Record::new(db.table());
        josh.add_char16("Name", "Josh");
        josh.add_int("Squat", 245);
        josh.add_int("Press", 105);
        db.insert(&mut josh).unwrap();

        let mut joe = Record::new(db.table());
        joe.add_char16("Name", "Joe Lifter");
        joe.add_int("Squat", 315);
        joe.add_int("Press", 135);
        joe.add_int("Deadlift", 365);
        joe.add_float("Wilks", 235.72);
        db.insert(&mut joe).unwrap();

        assert_eq!(db.record_count(), 2);
        let found = db.search_float("Wilks", 235.72).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get_id(), 2);

        let mut update = Record::new(db.table());
        update.set_id(1);
        update.add_int("Deadlift", 305);
        update.add_float("Wilks", 235.72);
        db.update(&update).unwrap();

        let found = db.search_float("Wilks", 235.72).unwrap();
        let mut ids: Vec<u32> = found.iter().map(|r| r.get_id()).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn s4_remove_triggers_compaction() {
        let scratch = ScratchDb::new("s4");
        let mut db = Database::create(&scratch.name, lifting_table()).unwrap();

        let mut josh = Record::new(db.table());
        josh.add_char16("Name", "Josh");
        db.insert(&mut josh).unwrap();

        let mut joe = Record::new(db.table());
        joe.add_char16("Name", "Joe Lifter");
        db.insert(&mut joe).unwrap();

        db.remove(2).unwrap();
        assert_eq!(db.record_count(), 1);
        assert_eq!(db.removed_count(), 0);
    }

    #[test]
    fn s5_threshold_not_crossed_then_crossed() {
        let scratch = ScratchDb::new("s5");
        let mut table = Table::new();
        table.add_field("n", FieldType::Int);
        let mut db = Database::create(&scratch.name, table.clone()).unwrap();

        for i in 0..3 {
            let mut record = Record::new(db.table());
            record.add_int("n", i);
            db.insert(&mut record).unwrap();
        }

        db.remove(2).unwrap();
        assert_eq!(db.record_count(), 3);
        assert_eq!(db.removed_count(), 1);

        let mut found: Vec<u32> = db
            .search_int("n", 0)
            .unwrap()
            .into_iter()
            .chain(db.search_int("n", 2).unwrap())
            .map(|r| r.get_id())
            .collect();
        found.sort();
        assert_eq!(found, vec![1, 3]);

        db.remove(3).unwrap();
        assert_eq!(db.record_count(), 1);
        assert_eq!(db.removed_count(), 0);
        let _ = table;
    }

    #[test]
    fn search_never_returns_a_tombstone() {
        let scratch = ScratchDb::new("tombstone-search");
        let mut table = Table::new();
        table.add_field("n", FieldType::Int);
        let mut db = Database::create(&scratch.name, table).unwrap();

        let mut record = Record::new(db.table());
        record.add_int("n", 7);
        db.insert(&mut record).unwrap();
        db.remove(1).unwrap();

        let found = db.search_int("n", 7).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn remove_zero_is_not_found() {
        let scratch = ScratchDb::new("remove-zero");
        let mut table = Table::new();
        table.add_field("n", FieldType::Int);
        let mut db = Database::create(&scratch.name, table).unwrap();
        assert!(matches!(db.remove(0), Err(StoreError::NotFound { id: 0 })));
    }

    #[test]
    fn update_on_tombstoned_slot_fails() {
        let scratch = ScratchDb::new("update-tombstone");
        let mut table = Table::new();
        table.add_field("n", FieldType::Int);
        let mut db = Database::create(&scratch.name, table).unwrap();

        let mut a = Record::new(db.table());
        a.add_int("n", 1);
        db.insert(&mut a).unwrap();
        let mut b = Record::new(db.table());
        b.add_int("n", 2);
        db.insert(&mut b).unwrap();
        let mut c = Record::new(db.table());
        c.add_int("n", 3);
        db.insert(&mut c).unwrap();

        db.remove(2).unwrap();

        let mut resurrect = Record::new(db.table());
        resurrect.set_id(2);
        resurrect.add_int("n", 99);
        assert!(matches!(
            db.update(&resurrect),
            Err(StoreError::NotFound { id: 2 })
        ));
    }

    #[test]
    fn search_with_unknown_field_is_a_schema_error() {
        let scratch = ScratchDb::new("unknown-field");
        let mut table = Table::new();
        table.add_field("n", FieldType::Int);
        let db = Database::create(&scratch.name, table).unwrap();
        assert!(matches!(
            db.search_int("nn", 1),
            Err(StoreError::Schema { .. })
        ));
    }

    #[test]
    fn load_reconstructs_counts() {
        let scratch = ScratchDb::new("load");
        {
            let mut table = Table::new();
            table.add_field("n", FieldType::Int);
            let mut db = Database::create(&scratch.name, table).unwrap();
            for i in 0..3 {
                let mut record = Record::new(db.table());
                record.add_int("n", i);
                db.insert(&mut record).unwrap();
            }
            db.remove(2).unwrap();
        }

        let reloaded = Database::load(&scratch.name).unwrap();
        assert_eq!(reloaded.record_count(), 3);
        assert_eq!(reloaded.removed_count(), 1);
    }
}
