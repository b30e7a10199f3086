//! NUL-terminated string tables (`.shstrtab`, `.strtab`, ...).

use crate::error::Result;
use crate::source::ByteSource;
use std::borrow::Cow;

/// Raw contents of a string table section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    data: Vec<u8>,
}

impl StringTable {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Name starting at byte `index`. See [`resolve`].
    pub fn get(&self, index: u32) -> Cow<'_, str> {
        resolve(&self.data, index as usize)
    }

    /// Whether `index` points inside the table at all.
    pub fn contains(&self, index: u32) -> bool {
        (index as usize) < self.data.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Returns the string that starts at `index` and runs to the next NUL or the end of `table`.
///
/// An index at or past the end of the table is an absent name, not an error, and yields `""`.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn resolve(table: &[u8], index: usize) -> Cow<'_, str> {
    let Some(tail) = table.get(index..) else {
        return Cow::Borrowed("");
    };
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    String::from_utf8_lossy(&tail[..end])
}

/// Seeks to `offset` and loads `size` bytes of string table.
pub fn load_string_table<S: ByteSource>(
    source: &mut S,
    offset: u64,
    size: u64,
) -> Result<StringTable> {
    log::debug!("loading {size} byte string table at {offset:#x}");
    let data = source.read_bytes(offset, size, "string table")?;
    Ok(StringTable::new(data))
}
