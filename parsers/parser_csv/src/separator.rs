use csv::ReaderBuilder;

/// Separators tried by [`sniff_separator`], in priority order
pub const SEPARATOR_CANDIDATES: [u8; 4] = [b';', b',', b'\t', b'|'];

/// How the field separator of a file is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Always use this byte
    Fixed(u8),
    /// Pick the first candidate that splits the header into more than one column
    Sniff,
}

impl Default for Separator {
    fn default() -> Self {
        Separator::Fixed(b',')
    }
}

impl Separator {
    /// Resolve the separator for already-decoded `text`
    pub fn resolve(self, text: &str) -> u8 {
        match self {
            Separator::Fixed(delimiter) => delimiter,
            Separator::Sniff => sniff_separator(text),
        }
    }
}

/// Return the first candidate separator yielding more than one header column, else `,`
pub fn sniff_separator(text: &str) -> u8 {
    for candidate in SEPARATOR_CANDIDATES {
        let mut reader = ReaderBuilder::new()
            .delimiter(candidate)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        if let Some(Ok(record)) = reader.records().next() {
            if record.len() > 1 {
                return candidate;
            }
        }
    }
    b','
}
