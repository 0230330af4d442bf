use once_cell::sync::Lazy;
use regex::Regex;

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a>").unwrap());
static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});
static PLAN_HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(pdf|docx?)$").unwrap());
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h5\b[^>]*>(.*?)</h5>|<h6\b[^>]*>(.*?)</h6>").unwrap());
static OPEN_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").unwrap());
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").unwrap());
static STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").unwrap());
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

const PLAN_LINK_PHRASES: &[&str] = &["учебный план", "план обучения"];
const FAQ_KEYWORDS: &[&str] = &[
    "вопрос",
    "экзамен",
    "как",
    "можно ли",
    "чем",
    "будет ли",
    "уровень",
    "сможу ли",
];
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

/// First anchor that names the study plan or points at a plan document.
/// Relative links are resolved against `origin`; anything that is neither
/// root-relative nor absolute is passed over.
pub fn find_plan_link(html: &str, origin: &str) -> Option<String> {
    for caps in ANCHOR_RE.captures_iter(html) {
        let href = HREF_RE
            .captures(&caps[1])
            .and_then(|h| h.get(1).or_else(|| h.get(2)).or_else(|| h.get(3)))
            .map(|m| decode_entities(m.as_str().trim()))
            .unwrap_or_default();
        let text = text_content(&caps[2]).to_lowercase();
        let candidate = PLAN_LINK_PHRASES.iter().any(|p| text.contains(p))
            || PLAN_HREF_RE.is_match(&href);
        if !candidate {
            continue;
        }
        if href.starts_with('/') {
            return Some(format!("{}{}", origin.trim_end_matches('/'), href));
        }
        if href.starts_with("http") {
            return Some(href);
        }
    }
    None
}

/// Question-like `<h5>`/`<h6>` headings with the element that follows each,
/// as `"{heading}\n{body}"` chunks separated by a blank line.
pub fn extract_faq_text(html: &str) -> String {
    let mut chunks = Vec::new();
    for caps in HEADING_RE.captures_iter(html) {
        let Some(inner) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let heading = text_content(inner.as_str());
        if heading.is_empty() {
            continue;
        }
        let lower = heading.to_lowercase();
        if !FAQ_KEYWORDS.iter().any(|k| lower.contains(k)) {
            continue;
        }
        let end = caps.get(0).map(|m| m.end()).unwrap_or(html.len());
        let body = next_sibling_element(html, end)
            .map(text_content)
            .unwrap_or_default();
        chunks.push(format!("{heading}\n{body}"));
    }
    chunks.join("\n\n")
}

/// Markup of the next element sibling starting at byte `from`, skipping
/// text and comments. `None` when the parent closes first.
fn next_sibling_element(html: &str, from: usize) -> Option<&str> {
    let mut pos = from;
    loop {
        let start = pos + html.get(pos..)?.find('<')?;
        let tail = &html[start..];
        if tail.starts_with("<!--") {
            pos = start + tail.find("-->")? + 3;
            continue;
        }
        if tail.starts_with("</") {
            return None;
        }
        let Some(open) = OPEN_TAG_RE.captures(tail) else {
            pos = start + 1;
            continue;
        };
        let name = open[1].to_ascii_lowercase();
        let open_end = start + open[0].len();
        if open[0].ends_with("/>") || VOID_ELEMENTS.contains(&name.as_str()) {
            return Some(&html[start..open_end]);
        }
        let mut depth = 1usize;
        for tag in TAG_RE.captures_iter(&html[open_end..]) {
            if !tag[2].eq_ignore_ascii_case(&name) {
                continue;
            }
            if &tag[1] == "/" {
                depth -= 1;
                if depth == 0 {
                    let close_end = open_end + tag.get(0)?.end();
                    return Some(&html[start..close_end]);
                }
            } else if !tag[0].ends_with("/>") {
                depth += 1;
            }
        }
        return Some(&html[start..]);
    }
}

/// Visible text of an HTML fragment with whitespace collapsed.
pub fn text_content(fragment: &str) -> String {
    let stripped = STRIP_RE.replace_all(fragment, " ");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{00A0}'),
                "laquo" => Some('«'),
                "raquo" => Some('»'),
                "mdash" => Some('—'),
                "ndash" => Some('–'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
