//! Declaration checks against raw file content.

use super::naming::Keyword;

/// `"{keyword} {identifier} "` as bytes. The trailing space requires another
/// token (`{`, `extends`, `implements`) after the identifier.
pub fn declaration_needle(keyword: Keyword, identifier: &str) -> Vec<u8> {
    format!("{} {} ", keyword, identifier).into_bytes()
}

/// Literal, case-sensitive search for the legacy declaration.
pub fn declares(content: &[u8], keyword: Keyword, legacy: &str) -> bool {
    let needle = declaration_needle(keyword, legacy);
    find(content, &needle, 0).is_some()
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| from + pos)
}

/// Replace every occurrence of `from` with `to`. Returns the new content and
/// the number of replacements.
pub fn replace_all(content: &[u8], from: &[u8], to: &[u8]) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(content.len());
    let mut count = 0;
    let mut start = 0;

    while let Some(pos) = find(content, from, start) {
        out.extend_from_slice(&content[start..pos]);
        out.extend_from_slice(to);
        start = pos + from.len();
        count += 1;
    }
    out.extend_from_slice(&content[start..]);

    (out, count)
}

/// Rewrite the legacy declaration to the canonical one.
pub fn rewrite_declaration(
    content: &[u8],
    keyword: Keyword,
    legacy: &str,
    canonical: &str,
) -> (Vec<u8>, usize) {
    replace_all(
        content,
        &declaration_needle(keyword, legacy),
        &declaration_needle(keyword, canonical),
    )
}
