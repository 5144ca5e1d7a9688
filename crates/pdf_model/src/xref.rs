//! Cross-Reference Table
//!
//! The table maps every object id to where its indirect object starts in the
//! file, or, for free ids, to the next free id. Entries are grouped into
//! subsections of contiguous ids; a subsection serializes as a
//! `first count` header followed by one fixed-width 20-byte record per id.

use crate::error::{PdfError, Result};
use std::io::{self, Write};

/// Generation of the free-list head (id 0), and the generation at which an
/// id is retired for good
pub const MAX_GENERATION: u16 = 65535;

/// Where an entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefLocation {
    /// In-use object starting at this byte offset
    InUse(u64),
    /// Free id; the value is the next free id in the chain (0 ends it)
    NextFree(u32),
}

/// A single cross-reference record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrefEntry {
    pub id: u32,
    pub generation: u16,
    pub location: XrefLocation,
}

impl XrefEntry {
    pub fn is_in_use(&self) -> bool {
        matches!(self.location, XrefLocation::InUse(_))
    }

    /// Offset for in-use entries
    pub fn offset(&self) -> Option<u64> {
        match self.location {
            XrefLocation::InUse(offset) => Some(offset),
            XrefLocation::NextFree(_) => None,
        }
    }

    fn write_record<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let (field, kind) = match self.location {
            XrefLocation::InUse(offset) => (offset, 'n'),
            XrefLocation::NextFree(next) => (next as u64, 'f'),
        };
        write!(out, "{:010} {:05} {} \n", field, self.generation, kind)
    }
}

/// A run of entries with contiguous ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrefSubsection {
    first_id: u32,
    entries: Vec<XrefEntry>,
}

impl XrefSubsection {
    fn new(entry: XrefEntry) -> Self {
        Self {
            first_id: entry.id,
            entries: vec![entry],
        }
    }

    pub fn first_id(&self) -> u32 {
        self.first_id
    }

    /// One past the last id covered
    pub fn end_id(&self) -> u32 {
        self.first_id + self.entries.len() as u32
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[XrefEntry] {
        &self.entries
    }

    fn contains(&self, id: u32) -> bool {
        id >= self.first_id && id < self.end_id()
    }
}

/// The cross-reference table of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReferenceTable {
    /// Sorted by `first_id`, pairwise disjoint and never adjacent
    subsections: Vec<XrefSubsection>,
}

impl Default for CrossReferenceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossReferenceTable {
    /// A table holding only the free-list head
    pub fn new() -> Self {
        Self {
            subsections: vec![XrefSubsection::new(XrefEntry {
                id: 0,
                generation: MAX_GENERATION,
                location: XrefLocation::NextFree(0),
            })],
        }
    }

    /// Add or replace the entry for `id`.
    ///
    /// The entry joins a subsection it is adjacent to; when it closes the gap
    /// between two subsections they become one.
    pub fn add_entry(&mut self, id: u32, location: XrefLocation, generation: u16) {
        let entry = XrefEntry {
            id,
            generation,
            location,
        };

        // Subsections starting at or before `id`
        let idx = self.subsections.partition_point(|s| s.first_id <= id);

        if idx > 0 {
            let prev = &mut self.subsections[idx - 1];
            if prev.contains(id) {
                let slot = (id - prev.first_id) as usize;
                prev.entries[slot] = entry;
                return;
            }
            if prev.end_id() == id {
                prev.entries.push(entry);
                let joins_next = self
                    .subsections
                    .get(idx)
                    .is_some_and(|next| next.first_id == id + 1);
                if joins_next {
                    let next = self.subsections.remove(idx);
                    self.subsections[idx - 1].entries.extend(next.entries);
                }
                return;
            }
        }

        if let Some(next) = self.subsections.get_mut(idx) {
            if next.first_id == id + 1 {
                next.entries.insert(0, entry);
                next.first_id = id;
                return;
            }
        }

        self.subsections.insert(idx, XrefSubsection::new(entry));
    }

    /// Mark `id` as free, bump its generation and relink the free chain.
    ///
    /// Returns the generation the id carries from now on.
    pub fn free(&mut self, id: u32) -> Result<u16> {
        let entry = self
            .entry(id)
            .filter(|e| id != 0 && e.is_in_use())
            .ok_or_else(|| PdfError::XrefParse(format!("id {} is not in use", id)))?;
        let generation = entry.generation.saturating_add(1);
        self.add_entry(id, XrefLocation::NextFree(0), generation);
        self.relink_free_list();
        Ok(generation)
    }

    /// Rewrite every free entry so the chain from id 0 visits all free ids in
    /// ascending order and ends at 0
    pub fn relink_free_list(&mut self) {
        let free_ids: Vec<u32> = self
            .entries()
            .filter(|e| !e.is_in_use())
            .map(|e| e.id)
            .collect();
        for (i, id) in free_ids.iter().enumerate() {
            let next = free_ids.get(i + 1).copied().unwrap_or(0);
            if let Some(entry) = self.entry_mut(*id) {
                entry.location = XrefLocation::NextFree(next);
            }
        }
    }

    /// Look up the entry for `id`
    pub fn entry(&self, id: u32) -> Option<&XrefEntry> {
        let idx = self.subsections.partition_point(|s| s.first_id <= id);
        let sub = self.subsections.get(idx.checked_sub(1)?)?;
        sub.entries.get((id - sub.first_id) as usize)
    }

    fn entry_mut(&mut self, id: u32) -> Option<&mut XrefEntry> {
        let idx = self.subsections.partition_point(|s| s.first_id <= id);
        let sub = self.subsections.get_mut(idx.checked_sub(1)?)?;
        let first = sub.first_id;
        sub.entries.get_mut((id - first) as usize)
    }

    /// All entries in ascending id order
    pub fn entries(&self) -> impl Iterator<Item = &XrefEntry> {
        self.subsections.iter().flat_map(|s| s.entries.iter())
    }

    pub fn subsections(&self) -> &[XrefSubsection] {
        &self.subsections
    }

    /// Number of entries across all subsections
    pub fn len(&self) -> usize {
        self.subsections.iter().map(XrefSubsection::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The trailer's Size: one past the highest id
    pub fn size(&self) -> u32 {
        self.subsections.last().map_or(0, XrefSubsection::end_id)
    }

    /// Write the `xref` section
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "xref\n")?;
        for sub in &self.subsections {
            write!(out, "{} {}\n", sub.first_id, sub.entries.len())?;
            for entry in &sub.entries {
                entry.write_record(out)?;
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut out);
        out
    }

    /// Re-read a table starting at the `xref` keyword.
    ///
    /// Parsing stops at the first line that is neither a subsection header nor
    /// a record, which is normally `trailer`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(bytes);
        let mut lines = text.split('\n').map(|l| l.trim_end_matches('\r'));

        match lines.next().map(str::trim) {
            Some("xref") => {}
            other => {
                return Err(PdfError::XrefParse(format!(
                    "expected 'xref' keyword, found {:?}",
                    other
                )))
            }
        }

        let mut table = Self {
            subsections: Vec::new(),
        };
        let mut lines = lines.peekable();
        while let Some(header) = lines.peek() {
            let mut parts = header.split_whitespace();
            let (Some(first), Some(count), None) = (parts.next(), parts.next(), parts.next())
            else {
                break;
            };
            let (Ok(first), Ok(count)) = (first.parse::<u32>(), count.parse::<u32>()) else {
                break;
            };
            lines.next();

            for id in first..first + count {
                let record = lines.next().ok_or_else(|| {
                    PdfError::XrefParse(format!("missing record for id {}", id))
                })?;
                let entry = parse_record(id, record)?;
                table.add_entry(id, entry.location, entry.generation);
            }
        }

        if table.subsections.is_empty() {
            return Err(PdfError::XrefParse("no subsections".to_string()));
        }
        Ok(table)
    }
}

fn parse_record(id: u32, record: &str) -> Result<XrefEntry> {
    let bad = || PdfError::XrefParse(format!("malformed record for id {}: {:?}", id, record));
    let mut parts = record.split_whitespace();
    let field: u64 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let generation: u16 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let location = match parts.next() {
        Some("n") => XrefLocation::InUse(field),
        Some("f") => XrefLocation::NextFree(u32::try_from(field).map_err(|_| bad())?),
        _ => return Err(bad()),
    };
    Ok(XrefEntry {
        id,
        generation,
        location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_table_has_free_head() {
        let table = CrossReferenceTable::new();
        let head = table.entry(0).unwrap();
        assert_eq!(head.generation, 65535);
        assert_eq!(head.location, XrefLocation::NextFree(0));
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_adjacent_entries_merge() {
        let mut table = CrossReferenceTable::new();
        table.add_entry(1, XrefLocation::InUse(15), 0);
        table.add_entry(2, XrefLocation::InUse(80), 0);
        assert_eq!(table.subsections().len(), 1);

        table.add_entry(5, XrefLocation::InUse(200), 0);
        assert_eq!(table.subsections().len(), 2);

        // 4 joins 5 from the front, 3 closes the gap
        table.add_entry(4, XrefLocation::InUse(150), 0);
        assert_eq!(table.subsections()[1].first_id(), 4);
        table.add_entry(3, XrefLocation::InUse(120), 0);
        assert_eq!(table.subsections().len(), 1);
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn test_replace_existing_entry() {
        let mut table = CrossReferenceTable::new();
        table.add_entry(1, XrefLocation::InUse(15), 0);
        table.add_entry(1, XrefLocation::InUse(99), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.entry(1).unwrap().offset(), Some(99));
    }

    #[test]
    fn test_record_format() {
        let mut table = CrossReferenceTable::new();
        table.add_entry(1, XrefLocation::InUse(17), 0);
        let out = String::from_utf8(table.to_bytes()).unwrap();
        assert_eq!(
            out,
            "xref\n0 2\n0000000000 65535 f \n0000000017 00000 n \n"
        );
        // Every record is exactly 20 bytes
        for line in out.lines().skip(2) {
            assert_eq!(line.len() + 1, 20);
        }
    }

    #[test]
    fn test_free_builds_ascending_chain() {
        let mut table = CrossReferenceTable::new();
        for id in 1..=4 {
            table.add_entry(id, XrefLocation::InUse(id as u64 * 100), 0);
        }
        assert_eq!(table.free(3).unwrap(), 1);
        assert_eq!(table.free(1).unwrap(), 1);

        assert_eq!(table.entry(0).unwrap().location, XrefLocation::NextFree(1));
        assert_eq!(table.entry(1).unwrap().location, XrefLocation::NextFree(3));
        assert_eq!(table.entry(3).unwrap().location, XrefLocation::NextFree(0));
        assert_eq!(table.entry(3).unwrap().generation, 1);
        assert!(table.entry(2).unwrap().is_in_use());
    }

    #[test]
    fn test_free_rejects_free_or_unknown_ids() {
        let mut table = CrossReferenceTable::new();
        table.add_entry(1, XrefLocation::InUse(10), 0);
        assert!(table.free(0).is_err());
        assert!(table.free(7).is_err());
        table.free(1).unwrap();
        assert!(table.free(1).is_err());
    }

    #[test]
    fn test_parse_round_trip() {
        let mut table = CrossReferenceTable::new();
        table.add_entry(1, XrefLocation::InUse(15), 0);
        table.add_entry(2, XrefLocation::InUse(64), 0);
        table.add_entry(9, XrefLocation::InUse(300), 2);
        table.free(2).unwrap();

        let mut bytes = table.to_bytes();
        bytes.extend_from_slice(b"trailer\n<< /Size 10 >>\n");
        let parsed = CrossReferenceTable::parse(&bytes).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CrossReferenceTable::parse(b"trailer\n").is_err());
        assert!(CrossReferenceTable::parse(b"xref\n0 2\n0000000000 65535 f \n").is_err());
        assert!(CrossReferenceTable::parse(b"xref\n0 1\n0000000000 65535 x \n").is_err());
    }

    proptest! {
        #[test]
        fn prop_subsections_gap_free_and_disjoint(ids in prop::collection::vec(1u32..200, 0..120)) {
            let mut table = CrossReferenceTable::new();
            for (i, id) in ids.iter().enumerate() {
                table.add_entry(*id, XrefLocation::InUse(i as u64), 0);
            }

            let subs = table.subsections();
            for sub in subs {
                for (offset, entry) in sub.entries().iter().enumerate() {
                    prop_assert_eq!(entry.id, sub.first_id() + offset as u32);
                }
            }
            for pair in subs.windows(2) {
                // Disjoint, and adjacent runs would have been merged
                prop_assert!(pair[0].end_id() < pair[1].first_id());
            }

            let mut unique = ids.clone();
            unique.sort_unstable();
            unique.dedup();
            prop_assert_eq!(table.len(), unique.len() + 1);
        }
    }
}
