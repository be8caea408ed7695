//! Human-readable output for file listings.

use std::collections::HashMap;

fn plural(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Format a listing: a summary line, then one line per file sorted by name.
pub fn format_listing(files: &HashMap<Vec<u8>, u64>) -> String {
    let total_size: u64 = files.values().sum();
    let mut out = format!(
        "Total {}, {}\n",
        plural(files.len() as u64, "file"),
        plural(total_size, "byte")
    );

    let mut entries: Vec<(String, u64)> = files
        .iter()
        .map(|(name, size)| (String::from_utf8_lossy(name).into_owned(), *size))
        .collect();
    entries.sort();

    let width = entries
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        + 1;
    for (name, size) in entries {
        out.push_str(&format!("{:<width$} {}\n", name, size, width = width));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_listing() {
        assert_eq!(format_listing(&HashMap::new()), "Total 0 files, 0 bytes\n");
    }

    #[test]
    fn test_single_file() {
        let files = HashMap::from([(b"a".to_vec(), 1)]);
        assert_eq!(format_listing(&files), "Total 1 file, 1 byte\na  1\n");
    }

    #[test]
    fn test_listing_alignment() {
        let files = HashMap::from([(b"init.lua".to_vec(), 123), (b"x".to_vec(), 7)]);
        assert_eq!(
            format_listing(&files),
            "Total 2 files, 130 bytes\n\
             init.lua  123\n\
             x         7\n"
        );
    }
}
