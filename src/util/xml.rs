use std::borrow::Cow;

const CDATA_END: &str = "]]>";

/// Splits text into pieces that can each be placed in a CDATA section.
///
/// A literal `]]>` would terminate the section early, so the text is split
/// between `]]` and `>`: adjacent sections `<![CDATA[a]]]]><![CDATA[>b]]>`
/// decode back to the original `a]]>b`. Always yields at least one piece.
///
/// # Examples
///
/// ```
/// use syndicate::util::cdata_sections;
///
/// assert_eq!(cdata_sections("plain"), vec!["plain"]);
/// assert_eq!(cdata_sections("a]]>b"), vec!["a]]", ">b"]);
/// ```
pub fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;

    while let Some(pos) = rest.find(CDATA_END) {
        // Keep "]]" in this section, start the next one at ">"
        let split = pos + 2;
        sections.push(&rest[..split]);
        rest = &rest[split..];
    }
    sections.push(rest);

    sections
}

/// Wraps arbitrary text in one or more CDATA sections.
///
/// # Examples
///
/// ```
/// use syndicate::util::wrap_cdata;
///
/// assert_eq!(wrap_cdata("<b>&</b>"), "<![CDATA[<b>&</b>]]>");
/// assert_eq!(wrap_cdata("x]]>y"), "<![CDATA[x]]]]><![CDATA[>y]]>");
/// ```
pub fn wrap_cdata(text: &str) -> String {
    cdata_sections(text)
        .into_iter()
        .map(|section| format!("<![CDATA[{section}]]>"))
        .collect()
}

/// Escapes `&`, `<`, `>`, `'` and `"` for element text or attribute values.
///
/// Returns `Cow::Borrowed` when nothing needs escaping.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}
