use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// Not a zip archive, or a required part is missing.
    InvalidDocx(String),
    Xml(roxmltree::Error),
    Zip(zip::result::ZipError),
    /// The main body part could not be turned into a paragraph model.
    Extraction(String),
    /// The generated text cannot be mapped onto the document.
    Mapping(String),
    /// Serialization or repackaging failed.
    Write(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidDocx(msg) => write!(f, "invalid DOCX: {msg}"),
            Error::Xml(e) => write!(f, "XML parse error: {e}"),
            Error::Zip(e) => write!(f, "zip error: {e}"),
            Error::Extraction(msg) => write!(f, "extraction failed: {msg}"),
            Error::Mapping(msg) => write!(f, "content mapping failed: {msg}"),
            Error::Write(msg) => write!(f, "write failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Xml(e) => Some(e),
            Error::Zip(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Zip(e)
    }
}
