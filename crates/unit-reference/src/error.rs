//! Error types for unit-reference

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core error: {0}")]
    Core(#[from] unit_core::Error),

    #[error("Template error: {0}")]
    Template(#[from] unit_template::Error),

    #[error("Bundled dataset '{name}' is invalid: {message}")]
    BundledData { name: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_data_error_names_the_dataset() {
        let err = Error::BundledData {
            name: "cities".to_string(),
            message: "expected an array".to_string(),
        };
        assert!(err.to_string().contains("cities"));
        assert!(err.to_string().contains("expected an array"));
    }
}
