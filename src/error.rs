pub type ReplayResult<T> = Result<T, ReplayError>;

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReplayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            ReplayError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(ReplayError::fetch("x").to_string().contains("fetch error:"));
        assert!(ReplayError::render("x").to_string().contains("render error:"));
        assert!(ReplayError::encode("x").to_string().contains("encode error:"));
        assert!(
            ReplayError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = ReplayError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
