//! # Sample Binary
//!
//! Builds a small powerlifting results table, inserts a couple of records,
//! and walks through a search, an update, and a removal, printing each step.
//! Meant as a runnable illustration of [`recordbase::Database`]'s API rather
//! than a serious tool.
//!
//! #### Authorship
//!
//! - Max Fierro, 2/24/2024 (maxfierro@berkeley.edu)

use std::path::Path;
use std::process;

use clap::Parser;
use colored::Colorize;

use recordbase::{Database, FieldType, Record, Table};

/* COMMAND LINE INTERFACE */

/// Builds and walks through a sample powerlifting results database.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Name of the database file to create (without extension).
    #[arg(short, long, default_value = "lifters")]
    name: String,
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
    table.add_field("Name", FieldType::Text16);
    table.add_field("Squat", FieldType::Int);
    table.add_field("Press", FieldType::Int);
    table.add_field("Deadlift", FieldType::Int);
    table.add_field("Wilks", FieldType::Float);

    let mut db = Database::create(&cli.name, table)?;
    println!("{}", format!("created database '{}'", cli.name).green());

    let mut josh = Record::new(db.table());
    josh.add_char16("Name", "Josh");
    josh.add_int("Squat", 245);
    josh.add_int("Press", 105);
    db.insert(&mut josh)?;
    println!("inserted Josh as record {}", josh.get_id());

    let mut joe = Record::new(db.table());
    joe.add_char16("Name", "Joe Lifter");
    joe.add_int("Squat", 315);
    joe.add_int("Press", 135);
    joe.add_int("Deadlift", 365);
    joe.add_float("Wilks", 235.72);
    db.insert(&mut joe)?;
    println!("inserted Joe Lifter as record {}", joe.get_id());

    let found = db.search_float("Wilks", 235.72)?;
    println!("search for Wilks == 235.72 found {} record(s)", found.len());

    // update replaces the whole slot, so start from Josh's current fields
    // rather than a record that only sets the two being changed.
    let mut update = josh.clone();
    update.add_int("Deadlift", 305);
    update.add_float("Wilks", 235.72);
    db.update(&update)?;
    println!("updated Josh's deadlift and Wilks score");

    db.remove(joe.get_id())?;
    println!(
        "removed Joe Lifter ({} live record(s) remain)",
        db.record_count() - db.removed_count()
    );

    Ok(())
}
