//! C5 — Index: an immutable mapping from member name to [`Entry`] (§4.5).

use std::collections::HashMap;

use super::structures::Entry;

/// Built once from a Central Directory traversal and never mutated again.
/// `list()` preserves Central Directory insertion order; `find()` is O(1)
/// average.
pub struct Index {
    order: Vec<String>,
    by_name: HashMap<String, Entry>,
}

impl Index {
    /// Build an index from an ordered list of Central Directory entries.
    /// When two entries share a name, the later one wins — matching the
    /// behavior of walking entries in order and overwriting — and a warning
    /// is logged naming the overwritten member (§3, §9 Open Question).
    pub fn build(entries: Vec<Entry>) -> Self {
        let mut order = Vec::with_capacity(entries.len());
        let mut by_name = HashMap::with_capacity(entries.len());

        for entry in entries {
            if by_name.contains_key(&entry.name) {
                tracing::warn!(name = %entry.name, "duplicate member name in Central Directory, last one wins");
            } else {
                order.push(entry.name.clone());
            }
            by_name.insert(entry.name.clone(), entry);
        }

        Self { order, by_name }
    }

    /// The member names, in Central Directory insertion order. Duplicate
    /// names appear once, at their first position, holding the last entry's
    /// metadata.
    pub fn list(&self) -> &[String] {
        &self.order
    }

    /// Look up a member by exact (byte-for-byte, post-UTF-8-decoding) name.
    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::CompressionMethod;

    fn entry(name: &str, uncompressed_size: u64) -> Entry {
        Entry {
            name: name.to_string(),
            local_header_offset: 0,
            compressed_size: uncompressed_size,
            uncompressed_size,
            compression_method: CompressionMethod::Stored,
            crc32: 0,
            is_directory: false,
            file_name_length: name.len() as u16,
            extra_field_length: 0,
            last_mod_time: 0,
            last_mod_date: 0,
        }
    }

    #[test]
    fn preserves_insertion_order() {
        let index = Index::build(vec![entry("b", 1), entry("a", 1), entry("c", 1)]);
        assert_eq!(index.list(), &["b", "a", "c"]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn find_looks_up_by_exact_name() {
        let index = Index::build(vec![entry("file.txt", 10)]);
        assert_eq!(index.find("file.txt").unwrap().uncompressed_size, 10);
        assert!(index.find("missing.txt").is_none());
    }

    #[test]
    fn duplicate_names_keep_first_position_but_last_metadata() {
        let index = Index::build(vec![entry("dup", 1), entry("dup", 99)]);
        assert_eq!(index.list(), &["dup"]);
        assert_eq!(index.find("dup").unwrap().uncompressed_size, 99);
    }

    #[test]
    fn empty_archive_has_empty_index() {
        let index = Index::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.list().is_empty());
    }
}
