//! Export filename derivation.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Anything other than letters (any script), digits, whitespace, `-`, `_`.
    static ref RE_UNSAFE: Regex = Regex::new(r"[^\p{L}\p{N}\s\-_]").unwrap();
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Strip unsafe characters, trim, and collapse whitespace runs to `_`.
/// Applying it twice gives the same result as applying it once.
pub fn sanitize(raw: &str) -> String {
    let kept = RE_UNSAFE.replace_all(raw, "");
    RE_WHITESPACE.replace_all(kept.trim(), "_").into_owned()
}

/// `Invoice-{number}_{recipient}.{ext}`, with `DRAFT` and `Client` standing
/// in for fields that are empty after sanitising.
pub fn export_filename(invoice_number: &str, recipient_name: &str, ext: &str) -> String {
    let number = non_empty(sanitize(invoice_number), "DRAFT");
    let recipient = non_empty(sanitize(recipient_name), "Client");
    format!("Invoice-{number}_{recipient}.{ext}")
}

fn non_empty(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
