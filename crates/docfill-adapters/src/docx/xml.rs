//! Text-node handling for WordprocessingML parts.
//!
//! Word keeps visible text in `<w:t>` elements inside runs, and splits a
//! single typed word over several runs whenever formatting, spell-check or
//! revision marks change. Placeholders therefore have to be matched over the
//! concatenated text of a paragraph, not per node.
//!
//! Text node contents are handled in their escaped form. Token characters
//! (`{`, `}`, ASCII alphanumerics and `_`) never appear inside an entity, so
//! matching on escaped text finds exactly the tokens a reader sees.
//!
//! Elements are matched by the literal `w:` prefix that Word and every
//! mainstream writer bind to the WordprocessingML namespace. A part that
//! binds the namespace to another prefix (`<x:t>`) is not recognised: its
//! placeholders are not reported and the part is copied through unchanged.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use docfill_core::domain::{MissingPolicy, SubstitutionReport, VariableMap, placeholders, substitute};

static TEXT_NODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(<w:t(?:\s[^>]*)?>)([^<]*)</w:t>").expect("text node pattern is valid")
});

static PARAGRAPH_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:p(?:\s[^>]*)?/?>|</w:p>").expect("paragraph pattern is valid")
});

#[derive(Debug)]
struct TextNode {
    open_tag: Range<usize>,
    content: Range<usize>,
}

/// Text nodes of `xml` grouped by paragraph, in document order.
///
/// A paragraph boundary between two nodes starts a new group, so the text of
/// a paragraph nested in a text box never joins the surrounding paragraph.
fn paragraphs(xml: &str) -> Vec<Vec<TextNode>> {
    let boundaries: Vec<usize> = PARAGRAPH_BOUNDARY.find_iter(xml).map(|m| m.start()).collect();

    let mut groups: Vec<Vec<TextNode>> = Vec::new();
    let mut current_key = None;

    for caps in TEXT_NODE.captures_iter(xml) {
        let (Some(open), Some(content)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let key = boundaries.partition_point(|&b| b < open.start());
        let node = TextNode {
            open_tag: open.range(),
            content: content.range(),
        };

        match groups.last_mut() {
            Some(group) if current_key == Some(key) => group.push(node),
            _ => {
                groups.push(vec![node]);
                current_key = Some(key);
            }
        }
    }

    groups
}

/// Distinct placeholder names in one XML part.
pub(crate) fn part_placeholders(xml: &str) -> BTreeSet<String> {
    paragraphs(xml)
        .iter()
        .flat_map(|group| {
            let runs: Vec<&str> = group.iter().map(|n| &xml[n.content.clone()]).collect();
            placeholders(&runs)
        })
        .collect()
}

/// Substitute placeholders in one XML part.
///
/// `escaped` must hold values already passed through [`escape_text`].
/// Returns `None` when nothing in the part changed.
pub(crate) fn fill_part(
    xml: &str,
    escaped: &VariableMap,
    policy: MissingPolicy,
) -> (Option<String>, SubstitutionReport) {
    let mut report = SubstitutionReport::default();
    // (node, new content) for every text node whose content changed.
    let mut rewrites: Vec<(TextNode, String)> = Vec::new();

    for group in paragraphs(xml) {
        let mut runs: Vec<String> = group.iter().map(|n| xml[n.content.clone()].to_string()).collect();
        let paragraph = substitute(&mut runs, escaped, policy);
        let changed = paragraph.changed;
        report.absorb(paragraph);
        if !changed {
            continue;
        }

        for (node, run) in group.into_iter().zip(runs) {
            if run != xml[node.content.clone()] {
                rewrites.push((node, run));
            }
        }
    }

    if rewrites.is_empty() {
        return (None, report);
    }

    let mut out = String::with_capacity(xml.len());
    let mut pos = 0;
    for (node, content) in &rewrites {
        let tag = &xml[node.open_tag.clone()];
        out.push_str(&xml[pos..node.open_tag.start]);
        out.push_str(&preserve_space(tag));
        out.push_str(content);
        pos = node.content.end;
    }
    out.push_str(&xml[pos..]);

    (Some(out), report)
}

/// Add `xml:space="preserve"` to a `<w:t ...>` opening tag if missing.
fn preserve_space(open_tag: &str) -> String {
    if open_tag.contains("xml:space=") {
        return open_tag.to_string();
    }
    let body = open_tag.strip_suffix('>').unwrap_or(open_tag);
    format!(r#"{body} xml:space="preserve">"#)
}

/// Escape a value for use as XML character data.
pub(crate) fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
