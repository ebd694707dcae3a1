use super::{errors::FormatError, registry::TextCodec};

/// Separator between page numbers in the persisted form.
pub const PAGE_DELIMITER: char = ',';

/// Joins the pages as base-10 numbers separated by [`PAGE_DELIMITER`].
///
/// The empty list encodes to the empty string. Order and duplicates are kept
/// as given.
pub fn encode(pages: &[u32]) -> String {
    pages
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(PAGE_DELIMITER.to_string().as_str())
}

/// Parses a persisted page list.
///
/// The empty string decodes to the empty list. Every other component must be
/// a non-empty run of ASCII digits that fits in a `u32`, otherwise the whole
/// value is rejected.
pub fn decode(raw: &str) -> Result<Vec<u32>, FormatError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(PAGE_DELIMITER)
        .enumerate()
        .map(|(position, entry)| parse_page(position, entry))
        .collect()
}

/// Coerces loosely formatted entries (form fields, CLI arguments) into pages.
///
/// Surrounding whitespace is ignored, anything else that is not a plain
/// non-negative integer fails with [`FormatError`] before any value is
/// produced.
pub fn parse_entries<I, S>(entries: I) -> Result<Vec<u32>, FormatError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| parse_page(position, entry.as_ref().trim()))
        .collect()
}

/// Splits a user supplied comma separated string and coerces each entry.
///
/// Blank input yields no pages.
pub fn parse_input(input: &str) -> Result<Vec<u32>, FormatError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }
    parse_entries(input.split(PAGE_DELIMITER))
}

fn parse_page(position: usize, entry: &str) -> Result<u32, FormatError> {
    if entry.is_empty() || !entry.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::InvalidPage {
            position,
            entry: entry.to_owned(),
        });
    }

    entry.parse().map_err(|_| FormatError::PageOutOfRange {
        position,
        entry: entry.to_owned(),
    })
}

/// The comma separated page list codec, registered as `comma`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommaPageListCodec;

impl CommaPageListCodec {
    pub const NAME: &'static str = "comma";
}

impl TextCodec<Vec<u32>> for CommaPageListCodec {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn encode(&self, value: &Vec<u32>) -> Result<String, FormatError> {
        Ok(encode(value))
    }

    fn decode(&self, raw: &str) -> Result<Vec<u32>, FormatError> {
        decode(raw)
    }
}
