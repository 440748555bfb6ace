//! SQL export of confirmed paths
//!
//! Produces one transaction with an `INSERT` batch for the distinct folders
//! and one for the distinct file names, keyed by the signed path hash.

use crate::resolver::split_full_path;
use sqpack_formats::hash::path_hash_signed;
use std::collections::BTreeSet;
use tracing::warn;

/// Render the export script for a set of confirmed paths
///
/// `archive_id` is written as a bare number when it parses as one (`060000`
/// becomes `60000`), otherwise as a quoted string. Paths without a directory
/// are skipped.
pub fn render<'a, I>(paths: I, archive_id: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut folders = BTreeSet::new();
    let mut names = BTreeSet::new();
    for path in paths {
        match split_full_path(path) {
            Ok((folder, name)) => {
                folders.insert(folder);
                names.insert(name);
            }
            Err(e) => warn!("Skipping {}", e),
        }
    }

    let archive = archive_id
        .parse::<u64>()
        .map_or_else(|_| format!("\"{archive_id}\""), |n| n.to_string());

    let mut out = String::from("BEGIN TRANSACTION;\n");
    write_batch(&mut out, "folders", "path", &folders, &archive);
    write_batch(&mut out, "filenames", "name", &names, &archive);
    out.push_str("COMMIT;\n");
    out
}

fn write_batch(out: &mut String, table: &str, column: &str, values: &BTreeSet<&str>, archive: &str) {
    if values.is_empty() {
        return;
    }

    out.push_str(&format!(
        "INSERT INTO \"{table}\" (\"hash\", \"{column}\", \"used\", \"archive\", \"version\") VALUES\n"
    ));
    let last = values.len() - 1;
    for (i, value) in values.iter().enumerate() {
        let terminator = if i == last { ';' } else { ',' };
        out.push_str(&format!(
            "({}, \"{}\", 0, {}, 8){}\n",
            path_hash_signed(value),
            value,
            archive,
            terminator
        ));
    }
}
