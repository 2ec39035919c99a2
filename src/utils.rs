//! # Utilities Module
//!
//! This module factors out common behavior across this project.
//!
//! #### Authorship
//!
//! - Max Fierro, 4/9/2023 (maxfierro@berkeley.edu)

use std::process;

/* ALGORITHMS */

/// Returns the most similar string to `model` in the vector `all`. Used for
/// checking user input against offerings to provide useful suggestions for
/// malformed field names. Assumes that `all` is not empty.
pub fn most_similar(model: &str, all: Vec<&str>) -> String {
    all.iter()
        .min_by(|s1, s2| {
            let d1 = strsim::damerau_levenshtein(model, s1);
            let d2 = strsim::damerau_levenshtein(model, s2);
            d1.cmp(&d2)
        })
        .unwrap()[..]
        .to_owned()
}

/* PRINTING AND OTHER I/O */

/// Prompts the user to confirm a potentially destructive operation (one that
/// would overwrite an existing file on disk). Only blocks when `yes` is
/// false; a caller passing `--yes` on the command line skips the prompt
/// entirely.
pub fn confirm_potential_overwrite(yes: bool, path: &str) {
    if yes {
        return;
    }
    println!("'{path}' already exists. Overwrite it? [y/n]: ");
    let mut yn = String::new();
    while !["n", "N", "y", "Y"].contains(&&yn[..]) {
        yn = String::new();
        std::io::stdin()
            .read_line(&mut yn)
            .expect("Failed to read user confirmation.");
        yn = yn.trim().to_string();
    }
    if yn == "n" || yn == "N" {
        process::exit(exitcode::OK)
    }
}

/* UNIT TESTING */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_similar_finds_closest_match() {
        let candidates = vec!["Squat", "Press", "Deadlift"];
        assert_eq!(most_similar("Squatt", candidates), "Squat");
    }
}
