//! # Benchmark Binary
//!
//! Times bulk insertion, linear search, and tombstone removal against a
//! scratch database of a caller-chosen size. Not a rigorous benchmark suite
//! (no warmup, no statistical repeats) -- just a quick way to see how the
//! fixed-width format and its compaction threshold behave at scale.
//!
//! #### Authorship
//!
//! - Max Fierro, 2/24/2024 (maxfierro@berkeley.edu)

use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser;
use colored::Colorize;

use recordbase::{Database, FieldType, Record, Table};

/* COMMAND LINE INTERFACE */

/// Benchmarks insertion, search, and removal on a scratch record store.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Name of the scratch database file to create (without extension).
    #[arg(short, long, default_value = "benchmark")]
    name: String,
    /// Number of records to insert.
    #[arg(short, long, default_value_t = 10_000)]
    records: u32,
    /// Skip the overwrite confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

/* PROGRAM ENTRY */

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{}", e.to_string().red());
        process::exit(exitcode::SOFTWARE);
    }
    process::exit(exitcode::OK);
}

fn run(cli: &Cli) -> recordbase::Result<()> {
    let path = format!("{}.pb", cli.name);
    if Path::new(&path).exists() {
        recordbase::utils::confirm_potential_overwrite(cli.yes, &path);
    }

    let mut table = Table::new();
    table.add_field("n", FieldType::Int);
    table.add_field("label", FieldType::Text16);

    let mut db = Database::create(&cli.name, table)?;

    let start = Instant::now();
    for i in 0..cli.records {
        let mut record = Record::new(db.table());
        record.add_int("n", i as i32);
        record.add_char16("label", &format!("row-{i}"));
        db.insert(&mut record)?;
    }
    let insert_elapsed = start.elapsed();
    println!(
        "{}",
        format!(
            "inserted {} records in {:.3}s ({:.0} records/s)",
            cli.records,
            insert_elapsed.as_secs_f64(),
            cli.records as f64 / insert_elapsed.as_secs_f64().max(1e-9)
        )
        .green()
    );

    let probe = cli.records / 2;
    let start = Instant::now();
    let found = db.search_int("n", probe as i32)?;
    let search_elapsed = start.elapsed();
    println!(
        "searched for n == {} in {:?}, found {} record(s)",
        probe,
        search_elapsed,
        found.len()
    );

    let start = Instant::now();
    let to_remove = cli.records / 4;
    for id in 1..=to_remove {
        db.remove(id)?;
    }
    let remove_elapsed = start.elapsed();
    println!(
        "removed {} records in {:.3}s ({} remaining live out of {} slots)",
        to_remove,
        remove_elapsed.as_secs_f64(),
        db.record_count() - db.removed_count(),
        db.record_count()
    );

    Ok(())
}
