use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParcelError {
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid {region} ring: {reason}")]
    InvalidRing { region: &'static str, reason: &'static str },
    #[error("editable region has no truthy `{key}` attribute")]
    MissingMarker { key: String },
    #[error("unknown sketch event kind `{0}`")]
    UnknownEventKind(String),
}
