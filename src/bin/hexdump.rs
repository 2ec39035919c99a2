//! # Hexdump Binary
//!
//! Reads a `.pb` file's raw bytes and prints its schema header and record
//! slots in hex and ASCII, without going through [`recordbase::Database`] at
//! all. Useful for inspecting the on-disk layout directly, including files
//! that fail to load because they are corrupt.
//!
//! #### Authorship
//!
//! - Max Fierro, 2/24/2024 (maxfierro@berkeley.edu)

use std::fs;
use std::process;

use byteorder::{ReadBytesExt, LE};
use clap::Parser;
use colored::Colorize;

/* COMMAND LINE INTERFACE */

/// Dumps the raw bytes of a record store file as hex and ASCII.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the `.pb` file to dump.
    path: String,
    /// Number of bytes per printed row.
    #[arg(short, long, default_value_t = 16)]
    width: usize,
}

/* PROGRAM ENTRY */

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{}", e.to_string().red());
        process::exit(exitcode::IOERR);
    }
    process::exit(exitcode::OK);
}

fn run(cli: &Cli) -> std::io::Result<()> {
    let bytes = fs::read(&cli.path)?;
    let header_len = describe_header(&bytes);
    println!("{}", "header".bold());
    dump_rows(&bytes[..header_len.min(bytes.len())], cli.width, 0);

    if bytes.len() > header_len {
        println!("{}", "record area".bold());
        dump_rows(&bytes[header_len..], cli.width, header_len);
    }
    Ok(())
}

/// Parses just enough of the header to report its length to the caller;
/// falls back to dumping the whole file as one undifferentiated region if
/// the header looks malformed.
fn describe_header(bytes: &[u8]) -> usize {
    let mut cursor = &bytes[..];
    let Ok(num_fields) = cursor.read_i32::<LE>() else {
        return bytes.len();
    };
    if num_fields < 0 {
        println!(
            "{}",
            format!("warning: negative num_fields ({num_fields})").yellow()
        );
        return bytes.len();
    }
    let Ok(field_size) = cursor.read_u32::<LE>() else {
        return bytes.len();
    };
    let table_bytes = 8 + num_fields as usize * field_size as usize;
    if table_bytes + 8 > bytes.len() {
        println!(
            "{}",
            "warning: declared header is larger than the file".yellow()
        );
        return bytes.len();
    }
    println!("num_fields = {num_fields}, field_size = {field_size}");
    let mut offset = 8;
    for i in 0..num_fields {
        let name = String::from_utf8_lossy(&bytes[offset..offset + 8])
            .trim_end()
            .to_owned();
        let tag = i32::from_le_bytes(
            bytes[offset + 8..offset + 12]
                .try_into()
                .unwrap_or([0; 4]),
        );
        println!("  field[{i}]: name = '{name}', tag = {tag}");
        offset += field_size as usize;
    }
    table_bytes + 8
}

fn dump_rows(bytes: &[u8], width: usize, base_offset: usize) {
    for (row, chunk) in bytes.chunks(width.max(1)).enumerate() {
        let offset = base_offset + row * width;
        let hex: String = chunk
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if (0x20..0x7f).contains(&b) {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        println!("{offset:08x}  {hex:<width$}  {ascii}", width = width * 3);
    }
}
