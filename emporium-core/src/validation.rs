use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// Request validation shared by the user and product services.
///
/// Lazy-loaded email validation regex, a practical subset of RFC 5322.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

const MAX_TEXT_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 32;

/// Validates an email address
///
/// ```rust
/// use emporium_core::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Validates a password: 6 to 32 characters, not only whitespace.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    if password.trim().is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password cannot be only whitespace".to_string(),
        ));
    }

    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    if len > MAX_PASSWORD_LEN {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be no more than {MAX_PASSWORD_LEN} characters long"
        )));
    }

    Ok(())
}

/// Validates a user or product name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    validate_text("Name", name).map_err(ValidationError::InvalidName)
}

/// Validates a product brand.
pub fn validate_brand(brand: &str) -> Result<(), ValidationError> {
    validate_text("Brand", brand).map_err(ValidationError::InvalidField)
}

/// Prices must be finite and strictly positive.
pub fn validate_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::InvalidPrice(format!(
            "Price must be a positive number, got {price}"
        )));
    }

    Ok(())
}

fn validate_text(label: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{label} cannot be empty or whitespace only"));
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(format!(
            "{label} must be no more than {MAX_TEXT_LEN} characters long"
        ));
    }

    Ok(())
}
