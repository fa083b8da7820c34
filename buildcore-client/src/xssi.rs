/// The four-byte XSSI guard (`)]}'`) both Gerrit and Gitiles prefix every
/// JSON response body with, followed by a newline, to defeat cross-site
/// script inclusion (§6). Callers must strip it before deserializing.
const XSSI_GUARD: &str = ")]}'";

pub fn strip_xssi(body: &str) -> &str {
    match body.strip_prefix(XSSI_GUARD) {
        Some(rest) => rest.trim_start_matches('\n'),
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_guard_and_leading_newline() {
        assert_eq!(strip_xssi(")]}'\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn passes_through_unguarded_body() {
        assert_eq!(strip_xssi("{\"a\":1}"), "{\"a\":1}");
    }
}
