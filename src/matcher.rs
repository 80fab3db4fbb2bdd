use std::collections::BTreeSet;

use crate::models::{MatchResult, Roster};

pub const DEFAULT_THRESHOLD: u8 = 75;

/// Best roster entry for `query`, if its confidence reaches `threshold`.
///
/// Ties keep the earliest record in roster order.
pub fn find<'a>(query: &str, roster: &'a Roster, threshold: u8) -> Option<MatchResult<'a>> {
    let query = query.trim();
    if query.is_empty() || roster.is_empty() {
        return None;
    }

    let mut best: Option<MatchResult<'a>> = None;
    for record in roster.records() {
        let confidence = token_set_ratio(query, &record.name);
        if best.as_ref().map_or(true, |current| confidence > current.confidence) {
            best = Some(MatchResult { record, confidence });
        }
    }

    let best = best?;
    tracing::debug!(
        section = roster.section(),
        query,
        candidate = %best.record.name,
        confidence = best.confidence,
        "best roster candidate"
    );
    (best.confidence >= threshold).then_some(best)
}

/// Word-set similarity in 0..=100, insensitive to word order and repeats.
pub fn token_set_ratio(left: &str, right: &str) -> u8 {
    let left = normalize(left);
    let right = normalize(right);
    if left.is_empty() || right.is_empty() {
        return 0;
    }

    let left_tokens: BTreeSet<&str> = left.split_whitespace().collect();
    let right_tokens: BTreeSet<&str> = right.split_whitespace().collect();

    let sect = join(left_tokens.intersection(&right_tokens));
    let left_only = join(left_tokens.difference(&right_tokens));
    let right_only = join(right_tokens.difference(&left_tokens));

    let combined_left = format!("{sect} {left_only}").trim().to_string();
    let combined_right = format!("{sect} {right_only}").trim().to_string();

    ratio(&sect, &combined_left)
        .max(ratio(&sect, &combined_right))
        .max(ratio(&combined_left, &combined_right))
}

/// Indel similarity: `2 * LCS / (len_a + len_b)`, scaled and rounded.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let total = (a.len() + b.len()) as f64;
    let score = 200.0 * longest_common_subsequence(&a, &b) as f64 / total;
    score.round().clamp(0.0, 100.0) as u8
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Arabic harakat, tanween, shadda and sukun (U+064B..=U+0652) plus the
/// superscript alef and tatweel. These never split a word.
fn is_arabic_mark(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{0652}' | '\u{0670}' | '\u{0640}')
}

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !is_arabic_mark(*c))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

fn join<'a, 'b>(tokens: impl Iterator<Item = &'a &'b str>) -> String
where
    'b: 'a,
{
    tokens.copied().collect::<Vec<_>>().join(" ")
}
