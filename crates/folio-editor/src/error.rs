use folio_core::{NodeId, PageId, TreeError};
use std::path::PathBuf;
use thiserror::Error;

/// Everything the interaction layer can fail with. Guard rejections
/// (deleting the last page, resizing below a floor, navigating past the
/// ends) are not errors; those calls return `false`.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{0}` is not a .json file")]
    NotJson(PathBuf),

    #[error("page `{0}` does not exist")]
    PageNotFound(PageId),

    #[error("node `{node}` does not accept `{mime}` files")]
    UnsupportedMedia { node: NodeId, mime: String },

    #[error("invalid key combination `{input}`: {reason}")]
    KeyCombo { input: String, reason: String },
}

impl EditorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
