//! Live-support handoff to a messaging deep link.

use crate::error::ErrorCode;
use crate::form::{self, FieldErrors};
use crate::uri;

/// Consultancy number the link opens a chat with.
pub const DEFAULT_NUMBER: &str = "37127333527";

/// First line of the prefilled message.
pub const DEFAULT_GREETING: &str = "Hello! I'm interested in studying abroad.";

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("invalid contact details: {0}")]
    Invalid(FieldErrors),

    #[error("contact number '{0}' has no digits")]
    BadNumber(String),
}

impl ContactError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Invalid(_) => ErrorCode::ValidationFailed,
            Self::BadNumber(_) => ErrorCode::ConfigParseError,
        }
    }
}

/// What the visitor typed into the support form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

impl ContactRequest {
    fn message(&self, greeting: &str) -> String {
        format!(
            "{greeting}\nName: {}\nEmail: {}\nPhone: {}",
            self.full_name, self.email, self.phone
        )
    }
}

/// Build `https://wa.me/<number>?text=<message>` for a valid request.
///
/// Non-digits in `number` are dropped, so `+371 2733 3527` style values work.
pub fn contact_link(
    number: &str,
    greeting: &str,
    request: &ContactRequest,
) -> Result<String, ContactError> {
    let errors = form::validate_contact(&request.full_name, &request.email, &request.phone);
    if !errors.is_empty() {
        return Err(ContactError::Invalid(errors));
    }

    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ContactError::BadNumber(number.to_string()));
    }

    let link = format!(
        "https://wa.me/{digits}?text={}",
        uri::encode_component(&request.message(greeting))
    );
    tracing::debug!(number = %digits, "contact link built");
    Ok(link)
}
