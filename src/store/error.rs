use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Template name cannot be empty")]
    InvalidTemplateName,

    #[error("Template '{0}' does not exist")]
    TemplateNotFound(String),
}
