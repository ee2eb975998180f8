//! Input validation for credentials
//!
//! Rejects values that could never match a record before any lookup happens.

/// Performs basic input sanitation to check for malicious or malformed usernames/passwords.
pub fn is_valid_input(input: &str) -> bool {
    !input.trim().is_empty() && !input.contains(['\r', '\n', '\0', ':'])
}

/// Both halves of a credential pair are acceptable for lookup.
pub fn is_valid_pair(username: &str, password: &str) -> bool {
    is_valid_input(username) && !password.is_empty() && !password.contains(['\r', '\n', '\0'])
}
