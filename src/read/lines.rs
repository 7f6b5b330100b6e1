use std::str;

use crate::{Error, Result};

/// A cursor over the lines of an uncompressed payload.
///
/// Reads advance the offset, so each line or byte range is consumed once.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lines<'data> {
    data: &'data [u8],
    offset: usize,
}

impl<'data> Lines<'data> {
    pub(crate) fn new(data: &'data [u8]) -> Self {
        Lines { data, offset: 0 }
    }

    /// The number of bytes consumed so far.
    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Return true if every byte has been consumed.
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Read the next line, without its newline.
    ///
    /// The final line is not required to end with a newline.
    pub(crate) fn next_line(&mut self, what: &str) -> Result<&'data str> {
        let rest = self.data.get(self.offset..).unwrap_or(&[]);
        if rest.is_empty() {
            return Err(Error::corrupt(format!("missing {}", what)));
        }
        let (line, consumed) = match memchr::memchr(b'\n', rest) {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.offset += consumed;
        str::from_utf8(line).map_err(|_| Error::corrupt(format!("{} is not valid UTF-8", what)))
    }

    /// Read exactly `len` bytes.
    pub(crate) fn read_bytes(&mut self, len: usize, what: &str) -> Result<&'data [u8]> {
        let bytes = self
            .offset
            .checked_add(len)
            .and_then(|end| self.data.get(self.offset..end))
            .ok_or_else(|| {
                Error::corrupt(format!(
                    "expected {} bytes of {}, found {}",
                    len,
                    what,
                    self.data.len().saturating_sub(self.offset)
                ))
            })?;
        self.offset += len;
        Ok(bytes)
    }

    /// Read a line containing a single integer.
    pub(crate) fn next_integer<T: str::FromStr>(&mut self, what: &str) -> Result<T> {
        let line = self.next_line(what)?;
        parse_integer(line, what)
    }

    /// Read a line of fields separated by `separator`.
    ///
    /// An empty line has no fields.
    pub(crate) fn next_fields(&mut self, separator: char, what: &str) -> Result<Vec<&'data str>> {
        let line = self.next_line(what)?;
        if line.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(line.split(separator).collect())
        }
    }

    /// Read a line of exactly `count` integers separated by spaces.
    pub(crate) fn next_row(&mut self, count: usize, what: &str) -> Result<Vec<i128>> {
        let fields = self.next_fields(' ', what)?;
        if fields.len() != count {
            return Err(Error::corrupt(format!(
                "expected {} values in {}, found {}",
                count,
                what,
                fields.len()
            )));
        }
        fields
            .into_iter()
            .map(|field| parse_integer(field, what))
            .collect()
    }
}

pub(crate) fn parse_integer<T: str::FromStr>(field: &str, what: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| Error::corrupt(format!("invalid integer {:?} in {}", field, what)))
}
