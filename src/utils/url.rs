// src/utils/url.rs

//! URL manipulation utilities.

/// Build the absolute URL of an issue from a listing link.
///
/// This is plain concatenation, not a URL join: the first `strip_segment`
/// is removed from the href, one leading `/` is dropped, the remainder is
/// appended to `base`, and the first `strip_segment` left in the result is
/// removed.
///
/// # Examples
/// ```
/// use journal_archiver::utils::url::issue_url;
///
/// assert_eq!(
///     issue_url("https://www.complex-systems.com/archives/", "/issues/32-1/", "/archives"),
///     "https://www.complex-systems.com/issues/32-1/"
/// );
/// ```
pub fn issue_url(base: &str, href: &str, strip_segment: &str) -> String {
    let href = remove_first(href, strip_segment);
    let path = href.strip_prefix('/').unwrap_or(&href);
    remove_first(&format!("{base}{path}"), strip_segment)
}

fn remove_first(value: &str, segment: &str) -> String {
    if segment.is_empty() {
        return value.to_string();
    }
    value.replacen(segment, "", 1)
}

/// Check that a link is an absolute http(s) URL whose path ends in `.pdf`.
///
/// Markup characters and whitespace are rejected outright; the URL parser
/// would otherwise percent-encode them into a "valid" path.
pub fn is_pdf_url(link: &str) -> bool {
    if link
        .chars()
        .any(|ch| ch.is_whitespace() || matches!(ch, '"' | '\'' | '<' | '>'))
    {
        return false;
    }
    match url::Url::parse(link) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some()
                && parsed.path().ends_with(".pdf")
        }
        Err(_) => false,
    }
}
