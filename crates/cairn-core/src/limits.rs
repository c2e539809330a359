//! Input validation limits for security and resource protection

use crate::error::{Error, Result};

/// Maximum results in a single page (1000)
pub const MAX_PAGE_SIZE: usize = 1000;

/// Maximum length of one qualified-name segment (256 chars)
pub const MAX_NAME_SEGMENT_LEN: usize = 256;

/// Maximum length of a search string (4KB)
pub const MAX_SEARCH_STRING_LEN: usize = 4 * 1024;

/// Validate a required name such as a preferred value
pub fn validate_required_name(parameter: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_parameter(parameter, "must not be blank"));
    }
    validate_segment_len(parameter, value)
}

/// Validate an optional name: absent is fine, present-but-blank is not
pub fn validate_optional_name(parameter: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) => validate_required_name(parameter, value),
        None => Ok(()),
    }
}

fn validate_segment_len(parameter: &str, value: &str) -> Result<()> {
    if value.len() > MAX_NAME_SEGMENT_LEN {
        return Err(Error::invalid_parameter(
            parameter,
            format!("too long: {} chars (max {})", value.len(), MAX_NAME_SEGMENT_LEN),
        ));
    }
    Ok(())
}

/// Validate a free-text search string
pub fn validate_search_string(search_string: &str) -> Result<()> {
    if search_string.len() > MAX_SEARCH_STRING_LEN {
        return Err(Error::invalid_parameter(
            "searchString",
            format!(
                "too long: {} chars (max {})",
                search_string.len(),
                MAX_SEARCH_STRING_LEN
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_name() {
        assert!(validate_required_name("preferredValue", "ACTIVE").is_ok());
        assert!(validate_required_name("preferredValue", "").is_err());
        assert!(validate_required_name("preferredValue", "   ").is_err());
        assert!(validate_required_name("preferredValue", &"x".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_optional_name() {
        assert!(validate_optional_name("typeName", None).is_ok());
        assert!(validate_optional_name("typeName", Some("Asset")).is_ok());
        assert!(validate_optional_name("typeName", Some("")).is_err());
    }

    #[test]
    fn test_validate_search_string() {
        assert!(validate_search_string("payroll.*").is_ok());
        assert!(validate_search_string(&"x".repeat(5000)).is_err());
    }
}
