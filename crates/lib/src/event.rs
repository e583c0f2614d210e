//! Inbound request event and invocation outcome.

use std::collections::HashMap;

/// HTTP-shaped event handed to the validator: method, headers, raw body.
/// Built once per request at the serving edge.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl InboundEvent {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Final redirect back to the form page: HTTP 303 with this Location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
}

impl Redirect {
    /// Base URL plus an optional `#fragment` carrying the outcome code.
    pub fn to(base: &str, fragment: Option<&str>) -> Self {
        let location = match fragment {
            Some(code) => format!("{}#{}", base, code),
            None => base.to_string(),
        };
        Self { location }
    }
}

/// What an invocation ends with. `Drop` is the honeypot path: no email, no
/// redirect, nothing that tells the submitter it was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Drop,
    Redirect(Redirect),
}
