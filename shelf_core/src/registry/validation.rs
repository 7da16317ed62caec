use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::error::RegistryError;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

pub const MAX_FILENAME_LENGTH: usize = 255;

/// Turns a client-supplied name into a bare file name that is safe to join
/// onto the upload directory.
///
/// The name is NFKD-decomposed and whatever is still non-ASCII is dropped,
/// so accented letters keep their base letter. Path separators become word breaks,
/// whitespace runs become a single `_`, anything outside `[A-Za-z0-9_.-]` is
/// removed and leading/trailing `.` and `_` are trimmed. The result never
/// contains a separator and is never `.` or `..`, but it may be empty.
pub fn sanitize(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");

    stripped.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[derive(Debug, Clone)]
pub struct DocumentValidator {
    extension: String,
}

impl DocumentValidator {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into().to_lowercase(),
        }
    }

    pub fn has_required_extension(&self, name: &str) -> bool {
        name.to_lowercase().ends_with(&self.extension)
    }

    /// Sanitizes a name that refers to a document already on disk.
    pub fn validate_existing_name(&self, raw_name: &str) -> Result<String, RegistryError> {
        let safe_name = sanitize(raw_name);
        self.check_sanitized(raw_name, &safe_name)?;
        Ok(safe_name)
    }

    /// Validates the original name of an uploaded file. The extension is
    /// checked on the raw name first and again after sanitization, since
    /// sanitizing can strip it.
    pub fn validate_upload_name(&self, raw_name: &str) -> Result<String, RegistryError> {
        if raw_name.is_empty() {
            return Err(RegistryError::InvalidName {
                name: raw_name.to_string(),
            });
        }

        if !self.has_required_extension(raw_name) {
            return Err(RegistryError::InvalidExtension {
                name: raw_name.to_string(),
                expected: self.extension.clone(),
            });
        }

        let safe_name = sanitize(raw_name);
        self.check_sanitized(raw_name, &safe_name)?;
        Ok(safe_name)
    }

    fn check_sanitized(&self, raw_name: &str, safe_name: &str) -> Result<(), RegistryError> {
        if !self.has_required_extension(safe_name) || safe_name.len() > MAX_FILENAME_LENGTH {
            return Err(RegistryError::InvalidName {
                name: raw_name.to_string(),
            });
        }
        Ok(())
    }
}
