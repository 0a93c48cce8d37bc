//! Bruker frame header tokenizer.
//!
//! The header is ASCII text in 512-byte blocks, itself made of 80-character
//! `key : value` records. `HDRBLKS` gives the total header length in blocks
//! and lives in the first block, so a reader bootstraps in two steps: parse
//! block zero for `HDRBLKS`, then parse the complete text.

use std::collections::BTreeMap;

/// Header block size in bytes.
pub const BLOCK_LEN: usize = 512;
/// Record length in characters.
pub const RECORD_LEN: usize = 80;

#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    #[error("header is not ASCII text")]
    NotText,
    #[error("missing header field `{0}`")]
    MissingField(&'static str),
    #[error("malformed header field `{key}`: {value:?}")]
    Malformed { key: &'static str, value: String },
    #[error("unsupported pixel size: {0} bytes per pixel")]
    PixelSize(i64),
    #[error("invalid header block count: {0}")]
    BlockCount(i64),
    #[error("header sizes overflow: {0}")]
    Oversized(&'static str),
}

type Result<T> = std::result::Result<T, HeaderError>;

/// The header fields the frame reader needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SfrmInfo {
    /// Image height (`NROWS`).
    pub rows: usize,
    /// Image width (`NCOLS`).
    pub cols: usize,
    /// Bytes per pixel of the primary image (`NPIXELB`), 1, 2 or 4.
    pub bytes_per_pixel: usize,
    /// First `NOVERFL` number: signed underflow count, not used for sizing.
    pub underflows: i64,
    /// Second `NOVERFL` number: entries in the 16-bit overflow table.
    pub overflows_16: usize,
    /// Third `NOVERFL` number: entries in the 32-bit overflow table.
    pub overflows_32: usize,
}

/// Tokenized header: record keys mapped to their raw value text.
#[derive(Debug, Default, Clone)]
pub struct SfrmHeader {
    records: BTreeMap<String, String>,
}

impl SfrmHeader {
    /// Tokenize raw header bytes.
    ///
    /// Records are fixed 80-character runs split at their first `:`, both
    /// sides trimmed. Runs without a `:` are block padding and are dropped,
    /// a shorter trailing run is allowed. A duplicated key keeps its first
    /// value.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(raw).map_err(|_| HeaderError::NotText)?;
        if !text.is_ascii() {
            return Err(HeaderError::NotText);
        }
        let mut records = BTreeMap::new();
        let mut rest = text;
        while !rest.is_empty() {
            let (record, tail) = rest.split_at(RECORD_LEN.min(rest.len()));
            rest = tail;
            if let Some((key, value)) = record.split_once(':') {
                records
                    .entry(key.trim().to_string())
                    .or_insert_with(|| value.trim().to_string());
            }
        }
        Ok(Self { records })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw value text of a record.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }

    /// First integer of a record's value.
    pub fn int(&self, key: &'static str) -> Result<i64> {
        let value = self.get(key).ok_or(HeaderError::MissingField(key))?;
        value
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok())
            .ok_or_else(|| HeaderError::Malformed {
                key,
                value: value.to_string(),
            })
    }

    /// All whitespace-separated integers of a record's value.
    pub fn ints(&self, key: &'static str) -> Result<Vec<i64>> {
        let value = self.get(key).ok_or(HeaderError::MissingField(key))?;
        value
            .split_whitespace()
            .map(|token| token.parse().ok())
            .collect::<Option<Vec<i64>>>()
            .ok_or_else(|| HeaderError::Malformed {
                key,
                value: value.to_string(),
            })
    }

    /// Total header length in blocks (`HDRBLKS`).
    pub fn blocks(&self) -> Result<usize> {
        let blocks = self.int("HDRBLKS")?;
        if blocks < 1 {
            return Err(HeaderError::BlockCount(blocks));
        }
        Ok(blocks as usize)
    }

    /// Extract and validate the fields the reader needs.
    pub fn info(&self) -> Result<SfrmInfo> {
        let rows = self.size("NROWS")?;
        let cols = self.size("NCOLS")?;
        let bytes_per_pixel = self.size("NPIXELB")?;
        if !matches!(bytes_per_pixel, 1 | 2 | 4) {
            return Err(HeaderError::PixelSize(bytes_per_pixel as i64));
        }
        let noverfl = self.ints("NOVERFL")?;
        // signed underflow count, then the 16- and 32-bit table sizes
        match noverfl[..] {
            [underflows, overflows_16, overflows_32, ..]
                if overflows_16 >= 0 && overflows_32 >= 0 =>
            {
                Ok(SfrmInfo {
                    rows,
                    cols,
                    bytes_per_pixel,
                    underflows,
                    overflows_16: overflows_16 as usize,
                    overflows_32: overflows_32 as usize,
                })
            }
            _ => Err(HeaderError::Malformed {
                key: "NOVERFL",
                value: self.get("NOVERFL").unwrap_or_default().to_string(),
            }),
        }
    }

    fn size(&self, key: &'static str) -> Result<usize> {
        let value = self.int(key)?;
        usize::try_from(value).map_err(|_| HeaderError::Malformed {
            key,
            value: value.to_string(),
        })
    }
}
