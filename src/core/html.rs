//! Minimal HTML slicing for scraped pages.
//!
//! Pages are only mined for two things: JSON state blobs embedded in
//! `<script>` tags, and plain `<table>` rows. Everything is case-insensitive
//! substring work; no DOM is built.

use serde_json::Value;

/// Script markers that precede embedded application state on known pages.
pub const STATE_MARKERS: &[&str] = &[
    "window['__espnfitt__']",
    "window[\"__espnfitt__\"]",
    "__NEXT_DATA__",
    "window.__INITIAL_STATE__",
    "window.__PRELOADED_STATE__",
];

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Find the first JSON object/array following any known state marker.
pub fn extract_embedded_json(html: &str) -> Option<Value> {
    STATE_MARKERS.iter().find_map(|marker| {
        let start = html.find(marker)? + marker.len();
        let rest = &html[start..];
        let open = rest.find(|c: char| c == '{' || c == '[')?;
        let blob = balanced_json(&rest[open..])?;
        serde_json::from_str(blob).ok()
    })
}

/// Slice a balanced `{...}` / `[...]` prefix, honoring string literals.
fn balanced_json(s: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in s.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[..idx + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte range of the next `<open ...>...</close>` block at or after `from`.
pub fn next_tag_block_ci(s: &str, lc: &str, open: &str, close: &str, from: usize) -> Option<(usize, usize)> {
    let start = lc.get(from..)?.find(open)? + from;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(close)?;
    let end = open_end + end_rel + close.len();
    Some((start, end))
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&out))
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All table rows in the document, each as its cell texts (`<th>` and `<td>`).
pub fn table_rows(html: &str) -> Vec<Vec<String>> {
    let lc = to_lower(html);
    let mut rows = Vec::new();
    let mut pos = 0;

    while let Some((start, end)) = next_tag_block_ci(html, &lc, "<tr", "</tr>", pos) {
        let row_html = &html[start..end];
        let row_lc = &lc[start..end];
        rows.push(row_cells(row_html, row_lc));
        pos = end;
    }
    rows
}

fn row_cells(row: &str, row_lc: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut pos = 0;

    loop {
        let td = row_lc.get(pos..).and_then(|s| s.find("<td")).map(|i| i + pos);
        let th = row_lc.get(pos..).and_then(|s| s.find("<th")).map(|i| i + pos);
        let (start, close) = match (td, th) {
            (Some(d), Some(h)) if h < d => (h, "</th>"),
            (Some(d), _) => (d, "</td>"),
            (None, Some(h)) => (h, "</th>"),
            (None, None) => break,
        };
        let Some(open_end) = row[start..].find('>').map(|i| i + start + 1) else {
            break;
        };
        let Some(close_rel) = row_lc[open_end..].find(close) else {
            break;
        };
        let end = open_end + close_rel;
        cells.push(strip_tags(&row[open_end..end]));
        pos = end + close.len();
    }
    cells
}
