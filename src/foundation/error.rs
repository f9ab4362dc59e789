use crate::host::Capability;

pub type PcboothResult<T> = Result<T, PcboothError>;

#[derive(thiserror::Error, Debug)]
pub enum PcboothError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("classification error: {0}")]
    Classification(String),

    #[error("host error: {0}")]
    Host(String),

    #[error("host does not support {0}")]
    Unsupported(Capability),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PcboothError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Errors that must stop the whole run rather than a single output.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Classification(_))
    }

    /// Failures scoped to one output file; the job moves on to the next combination.
    pub fn is_output_failure(&self) -> bool {
        matches!(self, Self::Render(_) | Self::Encode(_) | Self::Io(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
