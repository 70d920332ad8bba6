#[derive(Debug, Clone)]
pub struct CsvSettings {
    pub delimiter: char,
    /// Tolerate records whose field count differs from the header.
    pub flexible: bool,
}

impl CsvSettings {
    pub fn new(delimiter: char) -> Self {
        CsvSettings {
            delimiter,
            flexible: true,
        }
    }
}

impl Default for CsvSettings {
    fn default() -> Self {
        CsvSettings::new(',')
    }
}
