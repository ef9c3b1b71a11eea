use crate::DocId;
use thiserror::Error;

/// Errors raised while building a [`crate::CorpusIndex`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Two documents in the collection share an identifier.
    #[error("document {doc_id} appears more than once in the collection")]
    DuplicateDocumentId { doc_id: DocId },
}
