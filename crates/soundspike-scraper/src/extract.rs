//! Post-count extraction from raw page HTML.
//!
//! Tries extraction strategies in priority order (structural nested-element
//! match, semantic data-attribute selectors, `<strong>` text grammar,
//! whole-document scan) and returns the first strategy's result that is
//! greater than zero. When every strategy comes up empty the result is 0,
//! meaning "unknown", never an error; reconciliation must not treat it as
//! a true zero post count.

use regex::Regex;

use crate::number::{first_digit_run, parse_magnitude};

/// Extract the total post count from a sound page document.
#[must_use]
pub fn extract_post_count(html: &str) -> u64 {
    let strategies: [(&str, fn(&str) -> u64); 4] = [
        ("structural", structural_count),
        ("data-attribute", attribute_count),
        ("strong-text", strong_text_count),
        ("document-scan", document_scan_count),
    ];

    for (name, strategy) in strategies {
        let count = strategy(html);
        if count > 0 {
            tracing::debug!(strategy = name, count, "extracted post count");
            return count;
        }
    }

    tracing::debug!("no extraction strategy produced a post count");
    0
}

/// Strategy 1: the nested `h2 > h2 > strong` shape that historically holds
/// the count on sound pages.
fn structural_count(html: &str) -> u64 {
    let re = Regex::new(r"(?is)<h2[^>]*>\s*<h2[^>]*>\s*<strong[^>]*>(.*?)</strong>")
        .expect("valid regex");

    for cap in re.captures_iter(html) {
        let text = strip_tags(cap.get(1).map_or("", |m| m.as_str()));
        if let Some(count) = first_digit_run(&text) {
            if count > 0 {
                return count;
            }
        }
    }
    0
}

/// Strategy 2: a small fixed list of semantic data-attribute selectors.
fn attribute_count(html: &str) -> u64 {
    const SELECTORS: &[(&str, &str)] = &[
        ("data-e2e", "music-post-count"),
        ("data-e2e", "sound-post-count"),
        ("data-testid", "music-post-count"),
    ];

    for (attr, value) in SELECTORS {
        let re = Regex::new(&format!(
            r#"(?is)<[^>]*{attr}\s*=\s*["']{value}["'][^>]*>(.*?)<"#
        ))
        .expect("valid regex");

        if let Some(cap) = re.captures(html) {
            let text = cap.get(1).map_or("", |m| m.as_str());
            if let Some(count) = first_digit_run(text) {
                if count > 0 {
                    return count;
                }
            }
        }
    }
    0
}

/// Strategy 3: scan `<strong>` elements for text matching the shared
/// magnitude grammar followed by a post-count noun, or bare digits.
fn strong_text_count(html: &str) -> u64 {
    let strong_re = Regex::new(r"(?is)<strong[^>]*>(.*?)</strong>").expect("valid regex");
    let suffixed_re = Regex::new(r"(?i)^([\d,]+(?:\.\d+)?[KMB]?)\s*(?:posts?|videos?|uses?|creates?)$")
        .expect("valid regex");
    let bare_re = Regex::new(r"^([\d,]+)$").expect("valid regex");

    for cap in strong_re.captures_iter(html) {
        let text = strip_tags(cap.get(1).map_or("", |m| m.as_str()));
        let text = text.trim();

        for pattern in [&suffixed_re, &bare_re] {
            if let Some(m) = pattern.captures(text).and_then(|c| c.get(1)) {
                if let Some(count) = parse_magnitude(m.as_str()) {
                    if count > 0 {
                        return count;
                    }
                }
            }
        }
    }
    0
}

/// Strategy 4: whole-document scan. Applies the magnitude grammar to the
/// visible text and looks for `"postCount":<n>` / `"videoCount":<n>` JSON
/// fragments in the raw markup. When multiple matches exist the **maximum**
/// wins, an optimistic tie-break that survives partial or truncated markup.
fn document_scan_count(html: &str) -> u64 {
    let mut best: u64 = 0;

    let text = strip_tags(html);
    let grammar_re = Regex::new(
        r"(?i)(\d{1,3}(?:,\d{3})*(?:\.\d+)?[KMB]?)\s*(?:posts?|videos?|uses?|creates?)",
    )
    .expect("valid regex");
    for cap in grammar_re.captures_iter(&text) {
        if let Some(count) = cap.get(1).and_then(|m| parse_magnitude(m.as_str())) {
            best = best.max(count);
        }
    }

    // JSON fragments live inside inline scripts, so scan the raw markup.
    let json_re =
        Regex::new(r#""(?:postCount|videoCount)"\s*:\s*(\d+)"#).expect("valid regex");
    for cap in json_re.captures_iter(html) {
        if let Some(count) = cap.get(1).and_then(|m| m.as_str().parse::<u64>().ok()) {
            best = best.max(count);
        }
    }

    best
}

/// Replace markup tags with spaces, approximating the document's visible
/// text. Keeps inline-script bodies, matching how a DOM `textContent` walk
/// over this markup behaves.
fn strip_tags(html: &str) -> String {
    let re = Regex::new(r"(?s)<[^>]*>").expect("valid regex");
    re.replace_all(html, " ").into_owned()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;
