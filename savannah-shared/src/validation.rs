use serde::Serialize;

/// One failing field in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain.
pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn require_non_empty(errors: &mut Vec<FieldError>, path: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(path, format!("{} is required", path)));
    }
}

pub fn require_email(errors: &mut Vec<FieldError>, path: &str, value: &str) {
    if !looks_like_email(value) {
        errors.push(FieldError::new(path, format!("{} must be a valid email", path)));
    }
}

pub fn require_non_negative(errors: &mut Vec<FieldError>, path: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(FieldError::new(path, format!("{} must be greater than or equal to 0", path)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(looks_like_email("guest@example.com"));
        assert!(!looks_like_email("guest@example"));
        assert!(!looks_like_email("guest.example.com"));
        assert!(!looks_like_email("a b@example.com"));
        assert!(!looks_like_email("@example.com"));
    }
}
