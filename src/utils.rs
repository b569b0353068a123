//! Fixed-width line slicing shared by the catalog, inventory and `.dly` parsers.
//!
//! Every fixed-width format in the archive is described as a table of
//! [`FixedWidthField`]s; [`FixedWidthLine`] is the only place that turns those
//! byte offsets into text.

/// A named byte range `[start, end)` within a fixed-width line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FixedWidthField {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
}

impl FixedWidthField {
    pub(crate) const fn new(name: &'static str, start: usize, end: usize) -> Self {
        Self { name, start, end }
    }

    /// The same field shifted `offset` bytes to the right.
    pub(crate) const fn shifted(&self, offset: usize) -> Self {
        Self {
            name: self.name,
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// A borrowed line of fixed-width text.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedWidthLine<'a> {
    bytes: &'a [u8],
}

impl<'a> FixedWidthLine<'a> {
    pub(crate) fn new(line: &'a str) -> Self {
        Self {
            bytes: line.trim_end_matches(['\r', '\n']).as_bytes(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Raw text of `field`, truncated when the line ends early.
    ///
    /// Returns `None` when the field starts past the end of the line or the
    /// slice is not valid UTF-8.
    pub(crate) fn raw(&self, field: &FixedWidthField) -> Option<&'a str> {
        if field.start >= self.bytes.len() {
            return None;
        }
        let end = field.end.min(self.bytes.len());
        std::str::from_utf8(&self.bytes[field.start..end]).ok()
    }

    /// Trimmed text of `field`; blank fields are `None`.
    pub(crate) fn text(&self, field: &FixedWidthField) -> Option<&'a str> {
        self.raw(field)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Parses the trimmed field, treating blanks and parse failures alike.
    pub(crate) fn parse<T: std::str::FromStr>(&self, field: &FixedWidthField) -> Option<T> {
        self.text(field).and_then(|value| value.parse().ok())
    }
}
