//! ABOUTME: Protects {% raw %}...{% endraw %} spans across nested-render passes
//! ABOUTME: Tera strips raw tags on first render; nested mode must survive multiple passes

const MARK: char = '\u{0}';

/// Replace each `{% raw %}...{% endraw %}` span with an opaque placeholder
/// token that contains no template syntax, so repeated rendering passes
/// never touch the original content. Returns the placeholder text and the
/// original (tag-stripped) contents, indexed by placeholder order.
pub fn protect(text: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(text.len());
    let mut originals = Vec::new();
    let mut rest = text;

    while let Some(tag_start) = rest.find("{%") {
        let Some(tag_end_rel) = rest[tag_start..].find("%}") else {
            out.push_str(rest);
            rest = "";
            break;
        };
        let tag_end = tag_start + tag_end_rel + 2;
        let tag_body = rest[tag_start + 2..tag_start + tag_end_rel].trim();
        let tag_body = tag_body.trim_matches('-').trim();

        if tag_body != "raw" {
            out.push_str(&rest[..tag_end]);
            rest = &rest[tag_end..];
            continue;
        }

        out.push_str(&rest[..tag_start]);
        let after_open = &rest[tag_end..];

        let Some(close_start) = find_endraw(after_open) else {
            out.push_str(&rest[tag_start..]);
            rest = "";
            break;
        };
        let (inner, after_close) = after_open.split_at(close_start.0);
        let placeholder_idx = originals.len();
        originals.push(inner.to_string());
        out.push(MARK);
        out.push_str(&placeholder_idx.to_string());
        out.push(MARK);
        rest = &after_close[close_start.1..];
    }
    out.push_str(rest);

    (out, originals)
}

/// Returns `(inner_len, tag_len)`: the byte offset where `endraw`'s opening
/// `{%` begins, and the total length of its tag including the trailing `%}`.
fn find_endraw(text: &str) -> Option<(usize, usize)> {
    let mut search_from = 0;
    loop {
        let rel_start = text[search_from..].find("{%")?;
        let tag_start = search_from + rel_start;
        let rel_end = text[tag_start..].find("%}")?;
        let tag_end = tag_start + rel_end + 2;
        let body = text[tag_start + 2..tag_start + rel_end].trim();
        let body = body.trim_matches('-').trim();
        if body == "endraw" {
            return Some((tag_start, tag_end - tag_start));
        }
        search_from = tag_end;
    }
}

/// Restore the original raw-block contents in place of their placeholders.
pub fn restore(text: &str, originals: &[String]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(MARK) {
        out.push_str(&rest[..start]);
        let after = &rest[start + MARK.len_utf8()..];
        let Some(end_rel) = after.find(MARK) else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let idx: usize = after[..end_rel].parse().unwrap_or(usize::MAX);
        if let Some(original) = originals.get(idx) {
            out.push_str(original);
        }
        rest = &after[end_rel + MARK.len_utf8()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protect_and_restore_round_trips_raw_content() {
        let text = "before {% raw %}{{ x }}{% endraw %} after";
        let (protected, originals) = protect(text);
        assert!(!protected.contains("{{ x }}"));
        assert_eq!(restore(&protected, &originals), "before {{ x }} after");
    }

    #[test]
    fn protect_leaves_non_raw_tags_untouched() {
        let text = "{% if ok %}yes{% endif %}";
        let (protected, _originals) = protect(text);
        assert_eq!(protected, text);
    }

    #[test]
    fn protect_handles_multiple_raw_blocks() {
        let text = "{% raw %}a{% endraw %}-{% raw %}b{% endraw %}";
        let (protected, originals) = protect(text);
        assert_eq!(restore(&protected, &originals), "a-b");
        assert_eq!(originals, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn protect_handles_trim_markers() {
        let text = "{%- raw -%}{{ x }}{%- endraw -%}";
        let (protected, originals) = protect(text);
        assert_eq!(restore(&protected, &originals), "{{ x }}");
    }
}
