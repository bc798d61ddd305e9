pub type DraftResult<T> = Result<T, DraftError>;

#[derive(thiserror::Error, Debug)]
pub enum DraftError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DraftError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            DraftError::backend("x")
                .to_string()
                .contains("backend error:")
        );
        assert!(
            DraftError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(DraftError::render("x").to_string().contains("render error:"));
    }

    #[test]
    fn io_and_other_preserve_source() {
        let err = DraftError::from(std::io::Error::other("boom"));
        assert!(err.to_string().contains("boom"));

        let base = std::io::Error::other("bang");
        let err = DraftError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("bang"));
    }
}
