/// Errors that can occur while reading an OrthoXML document
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Malformed XML
    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// I/O error while reading the source
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// UTF-8 encoding error in an element or attribute name
    #[error("UTF-8 encoding error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    /// Document does not follow the OrthoXML section grammar
    #[error("Invalid OrthoXML structure: {0}")]
    InvalidStructure(String),

    /// Required XML attribute is missing
    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        /// Element the attribute belongs to
        element: &'static str,
        /// Attribute name
        attribute: &'static str,
    },

    /// Input ended inside an open element
    #[error("Unexpected end of input inside <{context}>")]
    UnexpectedEof {
        /// Element that was still open
        context: &'static str,
    },

    /// A score value is not a finite number
    #[error("Malformed value '{value}' for score '{score_id}'")]
    MalformedScore {
        /// Score id of the offending score
        score_id: String,
        /// Value text as found in the document
        value: String,
    },
}
