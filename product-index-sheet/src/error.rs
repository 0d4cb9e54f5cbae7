/// Errors that can occur while reading a spreadsheet.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "calamine")]
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// A required part of the workbook package is missing
    #[error("Missing workbook part: {0}")]
    MissingPart(String),

    /// A cell or row reference beyond the largest sheet Excel allows
    #[error("Cell reference out of range: {0}")]
    CellOutOfRange(String),

    /// No available reader handles this kind of file
    #[error("Unsupported spreadsheet: {0}")]
    Unsupported(String),
}

impl SheetError {
    pub fn missing_part(msg: impl Into<String>) -> Self {
        Self::MissingPart(msg.into())
    }

    pub fn cell_out_of_range(reference: impl Into<String>) -> Self {
        Self::CellOutOfRange(reference.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}
