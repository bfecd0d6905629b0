//! Line splitting that keeps terminators intact.

/// Split `content` into `(body, terminator)` pairs.
///
/// The terminator is `"\n"`, `"\r\n"` or empty for an unterminated last
/// line, so joining `body + terminator` reproduces the input exactly.
pub(crate) fn split(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content.split_inclusive('\n').map(|line| {
        if let Some(body) = line.strip_suffix("\r\n") {
            (body, "\r\n")
        } else if let Some(body) = line.strip_suffix('\n') {
            (body, "\n")
        } else {
            (line, "")
        }
    })
}

/// Rewrite each line with `f`; `None` keeps the line as is.
///
/// Returns the new content and the rewritten line bodies.
pub(crate) fn rewrite<F>(content: &str, mut f: F) -> (String, Vec<String>)
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(content.len());
    let mut touched = Vec::new();

    for (body, terminator) in split(content) {
        match f(body) {
            Some(new_body) => {
                out.push_str(&new_body);
                touched.push(new_body);
            }
            None => out.push_str(body),
        }
        out.push_str(terminator);
    }

    (out, touched)
}
