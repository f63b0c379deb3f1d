//! Parsing helpers for completion output.
//!
//! Providers return prose that may wrap the payload in a CLI JSON envelope,
//! a markdown code block, or surrounding commentary; everything here is about
//! digging the useful part out without ever failing the run.

use tracing::debug;

/// Unwrap the Claude CLI `{"result": "..."}` envelope, passing other output
/// through untouched.
pub fn unwrap_result_envelope(raw: &str) -> String {
    #[derive(serde::Deserialize)]
    struct CliEnvelope {
        result: String,
    }

    match serde_json::from_str::<CliEnvelope>(raw) {
        Ok(envelope) => envelope.result,
        Err(_) => raw.to_string(),
    }
}

/// Extract a JSON object or array from free-form completion output
pub fn extract_json(s: &str) -> Option<String> {
    let trimmed = s.trim();

    // First try: the whole string is valid JSON
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return Some(trimmed.to_string());
    }

    // Second try: extract from markdown code block
    let re = regex::Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").ok()?;
    for cap in re.captures_iter(s) {
        let potential_json = cap.get(1)?.as_str().trim();
        if serde_json::from_str::<serde_json::Value>(potential_json).is_ok() {
            return Some(potential_json.to_string());
        }
    }

    // Third try: find JSON object pattern
    let brace_start = s.find('{')?;
    let mut depth = 0;
    let mut end = brace_start;

    for (i, c) in s[brace_start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = brace_start + i + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    if depth == 0 && end > brace_start {
        let potential_json = &s[brace_start..end];
        if serde_json::from_str::<serde_json::Value>(potential_json).is_ok() {
            return Some(potential_json.to_string());
        }
    }

    debug!(
        "No JSON found in output: {}...",
        &s.chars().take(120).collect::<String>()
    );
    None
}

/// Pull the first non-empty line out of a completion, stripping code fences
/// and trailing punctuation. Used for single-label answers.
pub fn first_label(s: &str) -> Option<String> {
    s.lines()
        .map(|l| l.trim().trim_matches('`'))
        .find(|l| !l.is_empty())
        .map(|l| {
            l.trim_end_matches(['.', ':', '!'])
                .trim()
                .to_lowercase()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_envelope() {
        let raw = r#"{"result": "housing", "cost_usd": 0.01}"#;
        assert_eq!(unwrap_result_envelope(raw), "housing");
        assert_eq!(unwrap_result_envelope("plain text"), "plain text");
    }

    #[test]
    fn test_extract_json_direct() {
        let out = extract_json(r#"{"verdict": "approve"}"#).unwrap();
        assert!(out.contains("approve"));
    }

    #[test]
    fn test_extract_json_code_block() {
        let raw = "Here is my verdict:\n```json\n{\"verdict\": \"revise\", \"feedback\": \"cite the statute\"}\n```\nDone.";
        let out = extract_json(raw).unwrap();
        assert!(out.contains("cite the statute"));
    }

    #[test]
    fn test_extract_json_embedded() {
        let raw = "I think {\"verdict\": \"approve\", \"feedback\": null} covers it";
        let out = extract_json(raw).unwrap();
        assert!(out.starts_with('{'));
    }

    #[test]
    fn test_extract_json_none() {
        assert!(extract_json("no structured content here").is_none());
    }

    #[test]
    fn test_first_label() {
        assert_eq!(first_label("\n  Housing.\n").as_deref(), Some("housing"));
        assert_eq!(first_label("`employment`").as_deref(), Some("employment"));
        assert_eq!(first_label("   \n\n"), None);
    }
}
