use thiserror::Error;

/// Problems with the shape of the input documents.
///
/// These travel inside `anyhow::Error`; use `downcast_ref::<InputError>()` to
/// tell them apart from I/O or highlighter failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("request/response block must open with a `---` record header, found {found:?}")]
    ReqresHeader { found: String },

    #[error("table row {row} has {found} cells but the widest row has {expected}")]
    RaggedTable {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("<pre> block has no nested <code> element")]
    PreWithoutCode,

    #[error("<img> without a src attribute")]
    MissingImageSource,

    #[error("image `{src}` is not a local file")]
    RemoteImage { src: String },
}
