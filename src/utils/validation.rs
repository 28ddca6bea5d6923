use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Records a field failure next to whatever the derive already collected.
pub fn add_field_error(
    errors: &mut ValidationErrors,
    field: &'static str,
    code: &'static str,
    message: impl Into<String>,
) {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message.into()));
    errors.add(field, error);
}

/// Runs derive validation, lets `extra` add hand-written checks, and fails if anything was recorded.
pub fn validate_with<T, F>(val: &T, extra: F) -> Result<(), ValidationErrors>
where
    T: Validate,
    F: FnOnce(&mut ValidationErrors),
{
    let mut errors = match val.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    extra(&mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `local@domain.tld` with no whitespace and a dot somewhere after the `@`.
pub fn is_basic_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Optional leading `+` followed by 10 to 15 digits.
pub fn is_valid_phone(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_email_shapes() {
        assert!(is_basic_email("jane@example.com"));
        assert!(is_basic_email("j.doe+jobs@mail.example.io"));
        assert!(!is_basic_email("jane@example"));
        assert!(!is_basic_email("@example.com"));
        assert!(!is_basic_email("jane doe@example.com"));
        assert!(!is_basic_email("jane@@example.com"));
        assert!(!is_basic_email("jane@.com"));
    }

    #[test]
    fn phone_shapes() {
        assert!(is_valid_phone("+919876543210"));
        assert!(is_valid_phone("9876543210"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("+91-98765-43210"));
    }
}
