//! Media uploads into image, video, audio and document elements.
//!
//! Reading the file is asynchronous on the host side; when it completes the
//! bytes arrive here and land as a single `src` mutation holding a `data:`
//! URL. If the element was deleted while the read was in flight the upload
//! is dropped.

use crate::error::{EditorError, Result};
use crate::host::HostRuntime;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use folio_core::{MediaKind, NodeId, PropValue};

/// A finished file read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_url(&self) -> String {
        let mime = if self.mime.is_empty() {
            "application/octet-stream"
        } else {
            &self.mime
        };
        format!("data:{mime};base64,{}", STANDARD.encode(&self.bytes))
    }
}

/// Store `upload` on `node`. `Ok(false)` when the node no longer exists;
/// an error when the element does not take this kind of file.
pub fn complete_upload<H: HostRuntime>(host: &mut H, node: NodeId, upload: &MediaUpload) -> Result<bool> {
    let Some(snapshot) = host.node(node) else {
        log::debug!("upload for vanished node {node} dropped");
        return Ok(false);
    };
    let unsupported = || EditorError::UnsupportedMedia {
        node,
        mime: upload.mime.clone(),
    };
    let kind = snapshot.element_type.accepts_media().ok_or_else(unsupported)?;
    if !kind.accepts(&upload.mime) {
        return Err(unsupported());
    }

    let src = upload.data_url();
    Ok(host.set_prop(node, &mut |props| {
        props.set("src", PropValue::Text(src.clone()));
        if kind == MediaKind::AnyFile {
            props.set("fileName", PropValue::Text(upload.file_name.clone()));
            props.set("fileType", PropValue::Text(upload.mime.clone()));
        }
    }))
}

/// Remove the uploaded file from `node`.
pub fn clear_media<H: HostRuntime>(host: &mut H, node: NodeId) -> bool {
    let Some(kind) = host.node(node).and_then(|n| n.element_type.accepts_media()) else {
        return false;
    };
    host.set_prop(node, &mut |props| {
        props.set("src", PropValue::Null);
        if kind == MediaKind::AnyFile {
            props.set("fileName", PropValue::Null);
            props.set("fileType", PropValue::Null);
        }
    })
}
