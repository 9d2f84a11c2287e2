//! JSONP-like envelope stripping for the spreadsheet export endpoint.
//!
//! The export endpoint wraps its JSON payload in a function-call envelope:
//!
//! ```text
//! /*O_o*/
//! google.visualization.Query.setResponse({"version":"0.6",...});
//! ```
//!
//! The historical client sliced off a fixed 47-byte prefix and a 2-byte
//! suffix, which silently breaks whenever the prefix comment changes length.
//! Slicing between the first `{` and the last `}` is tolerant of both the
//! comment banner and the trailing `);`.

/// Strip the non-JSON prefix/suffix from an envelope-wrapped payload.
///
/// Returns the inner JSON text, or `None` when no balanced-looking object
/// span exists (no `{`, no `}`, or they are out of order).
#[must_use]
pub fn strip_envelope(body: &str) -> Option<&str> {
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&body[start..=end])
}

#[cfg(test)]
mod tests {
    use super::strip_envelope;

    #[test]
    fn strips_setresponse_wrapper() {
        let body = "/*O_o*/\ngoogle.visualization.Query.setResponse({\"table\":{\"rows\":[]}});";
        assert_eq!(strip_envelope(body), Some("{\"table\":{\"rows\":[]}}"));
    }

    #[test]
    fn tolerates_prefix_length_changes() {
        let body = "/* a much longer banner comment than usual */cb({\"a\":1});";
        assert_eq!(strip_envelope(body), Some("{\"a\":1}"));
    }

    #[test]
    fn bare_json_passes_through() {
        assert_eq!(strip_envelope("{\"a\":1}"), Some("{\"a\":1}"));
    }

    #[test]
    fn rejects_bodies_without_an_object() {
        assert_eq!(strip_envelope("<!doctype html><html></html>"), None);
        assert_eq!(strip_envelope(""), None);
        assert_eq!(strip_envelope("} nonsense {"), None);
    }
}
