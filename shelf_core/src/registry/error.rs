use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid file name: {name:?}")]
    InvalidName { name: String },

    #[error("Invalid extension for {name:?} (expected {expected})")]
    InvalidExtension { name: String, expected: String },

    #[error("Document not found: {name}")]
    NotFound { name: String },

    #[error("Document already exists: {name}")]
    AlreadyExists { name: String },

    #[error("Failed to delete {name}: {source}")]
    DeleteError { name: String, source: std::io::Error },

    #[error("Failed to write {name}: {reason}")]
    WriteError { name: String, reason: String },

    #[error("Failed to stream {name}: {source}")]
    StreamError { name: String, source: std::io::Error },

    #[error("Failed to read upload directory: {0}")]
    DirectoryRead(#[source] std::io::Error),
}

impl RegistryError {
    /// Message shown to the user on the listing page.
    pub fn notice(&self) -> String {
        match self {
            RegistryError::InvalidName { .. } => "Invalid file name".to_string(),
            RegistryError::InvalidExtension { expected, .. } => {
                format!("Only {} files are allowed", expected)
            }
            RegistryError::NotFound { .. } => "File not found".to_string(),
            RegistryError::AlreadyExists { name } => format!("File \"{}\" already exists", name),
            RegistryError::DeleteError { .. } => "Error while deleting the file".to_string(),
            RegistryError::WriteError { .. } => "Error while uploading the file".to_string(),
            RegistryError::StreamError { .. } => "Error while downloading the file".to_string(),
            RegistryError::DirectoryRead(_) => "Unable to read the upload directory".to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RegistryError::InvalidName { .. }
                | RegistryError::InvalidExtension { .. }
                | RegistryError::NotFound { .. }
                | RegistryError::AlreadyExists { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices() {
        let err = RegistryError::AlreadyExists { name: "book.mobi".to_string() };
        assert_eq!(err.notice(), "File \"book.mobi\" already exists");

        let err = RegistryError::InvalidExtension {
            name: "image.png".to_string(),
            expected: ".mobi".to_string(),
        };
        assert_eq!(err.notice(), "Only .mobi files are allowed");
        assert!(err.is_validation());

        let err = RegistryError::WriteError {
            name: "book.mobi".to_string(),
            reason: "disk full".to_string(),
        };
        assert_eq!(err.notice(), "Error while uploading the file");
        assert!(!err.is_validation());
    }
}
