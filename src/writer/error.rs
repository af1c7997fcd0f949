/// Errors that can occur while writing an OrthoXML document
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error on the destination
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the XML serializer
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// Items arrived in an order that cannot form a well-formed document
    #[error("Unbalanced document: {0}")]
    UnbalancedDocument(String),

    /// Error from background writer thread
    #[error("Background writer error: {0}")]
    BackgroundWriterError(String),

    /// Background writer thread panicked
    #[error("Background writer thread panicked")]
    ThreadPanicked,
}
