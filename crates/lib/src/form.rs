//! Request validation: assert the event is shaped like a standard form post
//! and extract the submitted fields.

use crate::event::InboundEvent;
use std::collections::HashMap;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decoded form fields. Duplicate keys resolve to the last occurrence.
pub type FieldSet = HashMap<String, String>;

/// Transport-level rejection. Both variants are fatal for the invocation:
/// the serving edge logs them and answers 500, never a redirect.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("unexpected HTTP method \"{0}\"")]
    UnsupportedMethod(String),
    #[error("unexpected content type \"{0}\"")]
    UnsupportedContentType(String),
}

/// Media type portion of a Content-Type value: text before any `;` parameter.
fn media_type(value: &str) -> &str {
    value.split(';').next().unwrap_or("").trim()
}

/// Validate transport shape and decode the urlencoded body. Pure function of
/// the event: method must be exactly POST and the content type must be
/// urlencoded form data (any `;charset=...` parameter is ignored).
pub fn validate(event: &InboundEvent) -> Result<FieldSet, ValidateError> {
    if event.method != "POST" {
        return Err(ValidateError::UnsupportedMethod(event.method.clone()));
    }
    let content_type = event.header("content-type").unwrap_or("");
    if media_type(content_type) != FORM_CONTENT_TYPE {
        return Err(ValidateError::UnsupportedContentType(
            content_type.to_string(),
        ));
    }
    Ok(url::form_urlencoded::parse(event.body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}
