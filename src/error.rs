//! Error types for asset loading. The rasterizer pipeline itself never
//! returns an error — it is a total function over valid inputs (spec §7).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("malformed face line: {0}")]
    MalformedFace(String),

    #[error("unsupported TGA datatype: {0}")]
    UnsupportedTgaDatatype(i8),

    #[error("unsupported TGA colormap (colourmaptype must be 0)")]
    UnsupportedTgaColormap,

    #[error("truncated TGA file")]
    TruncatedTga,
}
