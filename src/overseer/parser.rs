//! Parser for classifier responses.
//!
//! The classifier is asked for a strict JSON object, but small local models
//! routinely wrap it in prose or code fences, or drop JSON entirely and
//! answer with a bare verdict token. Parsing degrades through three stages;
//! anything that survives none of them is malformed and handled fail-closed
//! by the auditor.

use serde::Deserialize;

use crate::security::Verdict;

#[derive(Debug, Deserialize)]
struct VerdictPayload {
    verdict: String,
    #[serde(default)]
    reason: String,
}

/// Parse a raw classifier response into a verdict and reason.
///
/// Stages, in order:
/// 1. the whole response as a JSON object
/// 2. the first `{...}` block embedded in the response
/// 3. a leading verdict token (`ALLOW`/`CHALLENGE`/`BLOCK` as first word),
///    with the full response as the reason
pub fn parse_verdict(response: &str) -> Option<(Verdict, String)> {
    let trimmed = response.trim();

    if let Some(parsed) = parse_json_object(trimmed) {
        return Some(parsed);
    }

    if let Some(block) = extract_json_block(trimmed) {
        if let Some(parsed) = parse_json_object(block) {
            return Some(parsed);
        }
    }

    parse_leading_token(trimmed)
}

fn parse_json_object(text: &str) -> Option<(Verdict, String)> {
    let payload: VerdictPayload = serde_json::from_str(text).ok()?;
    let verdict = token_to_verdict(&payload.verdict)?;
    Some((verdict, payload.reason))
}

/// Slice out the first balanced `{...}` region, tolerating fenced output.
fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_leading_token(text: &str) -> Option<(Verdict, String)> {
    let first_word = text.split_whitespace().next()?;
    let token: String = first_word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();
    let verdict = token_to_verdict(&token)?;
    Some((verdict, text.to_string()))
}

fn token_to_verdict(token: &str) -> Option<Verdict> {
    match token.trim().to_ascii_uppercase().as_str() {
        "ALLOW" => Some(Verdict::Allow),
        "CHALLENGE" => Some(Verdict::Challenge),
        "BLOCK" => Some(Verdict::Block),
        _ => None,
    }
}
