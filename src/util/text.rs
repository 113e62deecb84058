use std::borrow::Cow;

/// Substrings preferred as truncation cut points, in no particular order.
///
/// Only the rightmost match across all markers matters, so reordering this
/// list never changes the result of [`truncate_at_boundary`].
pub const BOUNDARY_MARKERS: [&str; 6] = [". ", "? ", "! ", ", ", "; ", "-"];

/// Truncates text to at most `max_len` characters at a natural boundary.
///
/// Markup tags are stripped first. If the stripped text is already shorter
/// than `max_len` it is returned as-is. Otherwise the first `max_len`
/// characters are trimmed and cut after the rightmost clause boundary
/// (see [`BOUNDARY_MARKERS`]), or after the rightmost space when that space
/// is further right by more than a quarter of `max_len`.
///
/// # Arguments
///
/// * `text` - The text to bound, possibly containing markup
/// * `max_len` - Maximum length in characters; `0` disables both stripping and truncation
///
/// # Returns
///
/// - If `max_len == 0`, returns `Cow::Borrowed(text)` untouched
/// - If the stripped text is shorter than `max_len`, returns it without trimming
/// - Otherwise returns a trimmed prefix of at most `max_len` characters
///
/// # Edge Case Behavior
///
/// Lengths count chars, not bytes, so multi-byte text is never split inside a
/// code point. A boundary whose last character sits at index 0 counts as no
/// boundary at all, in which case the whole `max_len` window is kept.
///
/// # Examples
///
/// ```
/// use syndicate::util::truncate_at_boundary;
///
/// // Clause boundary wins over a nearby word break
/// let text = "Hello world. This is a test sentence that goes on.";
/// assert_eq!(truncate_at_boundary(text, 20), "Hello world.");
///
/// // Short text passes through with tags removed
/// assert_eq!(truncate_at_boundary("<p>Short</p>", 20), "Short");
///
/// // Zero opts out entirely
/// assert_eq!(truncate_at_boundary("<p>Kept</p>", 0), "<p>Kept</p>");
/// ```
pub fn truncate_at_boundary(text: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed(text);
    }

    let stripped = strip_tags(text);
    if stripped.chars().count() < max_len {
        return stripped;
    }

    let window_end = byte_offset(&stripped, max_len);
    let window = stripped[..window_end].trim();

    let mut best = BOUNDARY_MARKERS
        .iter()
        .filter_map(|marker| {
            window
                .rfind(marker)
                .map(|pos| char_index(window, pos) + marker.chars().count() - 1)
        })
        .max()
        .unwrap_or(0);

    if let Some(space) = window.rfind(' ').map(|pos| char_index(window, pos)) {
        if space > best && space.saturating_sub(max_len / 4) > best {
            best = space;
        }
    }

    if best == 0 {
        return Cow::Owned(window.to_string());
    }

    let cut = byte_offset(window, best + 1);
    Cow::Owned(window[..cut].trim().to_string())
}

/// Removes markup tags, keeping the text between them.
///
/// A `<` only opens a tag when followed by an ASCII letter, `/`, `!` or `?`,
/// so comparisons such as `a < b` survive. A tag with no closing `>` is kept
/// verbatim. Removal repeats until a pass finds no tag, since dropping an
/// inner tag can join a kept `<` to the text after it (`x <<b>a> y`).
///
/// Returns `Cow::Borrowed` when the input contains no tag (common case).
///
/// # Examples
///
/// ```
/// use syndicate::util::strip_tags;
///
/// assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
/// assert_eq!(strip_tags("1 < 2"), "1 < 2");
/// assert_eq!(strip_tags("x <<b>a> y"), "x  y");
/// ```
pub fn strip_tags(s: &str) -> Cow<'_, str> {
    let Some(mut stripped) = strip_pass(s) else {
        return Cow::Borrowed(s);
    };
    while let Some(next) = strip_pass(&stripped) {
        stripped = next;
    }
    Cow::Owned(stripped)
}

/// One left-to-right removal pass; `None` when nothing was removed.
fn strip_pass(s: &str) -> Option<String> {
    if !s.contains('<') {
        return None;
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    let mut removed = false;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        let opens_tag = tail[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));

        match tail.find('>') {
            Some(close) if opens_tag => {
                removed = true;
                rest = &tail[close + 1..];
            }
            _ => {
                out.push('<');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    removed.then_some(out)
}

/// Number of chars preceding byte offset `byte` in `s`.
fn char_index(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

/// Byte offset of the `n`th char in `s`, or `s.len()` past the end.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(idx, _)| idx)
}
