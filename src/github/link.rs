//! `link` response header parsing for search pagination.

/// Extracts the `rel="next"` URL from a `link` header value.
///
/// The header is a comma-separated list of `<url>; rel="..."` parts. The
/// next-page URL is already fully formed, so callers follow it verbatim.
pub fn next_url(header: &str) -> Option<String> {
    for part in header.split(',') {
        let mut sections = part.split(';');
        let url = sections.next()?.trim();
        if !url.starts_with('<') || !url.ends_with('>') {
            continue;
        }
        let is_next = sections
            .any(|param| matches!(param.trim(), r#"rel="next""# | "rel=next"));
        if is_next {
            return Some(url[1..url.len() - 1].to_string());
        }
    }
    None
}
