//! Verdict parsing for the response reviewer.
//!
//! The reviewer answers in a tagged-section grammar (fixed headers, one item
//! per line). This module extracts a fully-typed
//! [`ReviewVerdict`] from that free-form text. Pure domain logic — no I/O,
//! just pattern matching.
//!
//! # Grammar
//!
//! ```text
//! STATUS: APPROVED | NEEDS_IMPROVEMENT
//! SCORE: 0-100
//! ISSUES:
//! - one issue per line
//! SUGGESTIONS:
//! - one suggestion per line
//! TOOL_SUGGESTIONS:
//! - tool | params | reason
//! PARAM_VALIDATION:
//! - tool | param | issue | suggested value
//! FEEDBACK: free text, may continue on following lines
//! ```
//!
//! The parser is tolerant: missing sections map to empty lists, headers are
//! matched case-insensitively, and bullets may use `-` or `*`. The one thing
//! it refuses to guess is the score — if no score can be extracted the whole
//! parse returns `None`, and the caller substitutes
//! [`ReviewVerdict::unparseable`], forcing NEEDS_IMPROVEMENT. Conservative:
//! a missing or unrecognized status also degrades to NEEDS_IMPROVEMENT.

use super::verdict::{ParamValidation, ReviewStatus, ReviewVerdict, ToolSuggestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Issues,
    Suggestions,
    ToolSuggestions,
    ParamValidation,
    Feedback,
}

/// Parse a reviewer response into a [`ReviewVerdict`].
///
/// Returns `None` when no score can be extracted — the designated
/// "unparseable" outcome. Never returns a partially-filled verdict.
pub fn parse_review_verdict(response: &str) -> Option<ReviewVerdict> {
    let mut status: Option<ReviewStatus> = None;
    let mut score: Option<u8> = None;
    let mut issues = Vec::new();
    let mut suggestions = Vec::new();
    let mut tool_suggestions = Vec::new();
    let mut param_validation = Vec::new();
    let mut feedback_lines: Vec<String> = Vec::new();
    let mut section = Section::None;

    for raw_line in response.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let upper = line.to_uppercase();

        if let Some(rest) = strip_header(line, &upper, "STATUS:") {
            status = parse_status(rest);
            section = Section::None;
        } else if let Some(rest) = strip_header(line, &upper, "SCORE:") {
            score = parse_score(rest);
            section = Section::None;
        } else if upper.starts_with("ISSUES:") {
            section = Section::Issues;
        } else if upper.starts_with("SUGGESTIONS:") {
            section = Section::Suggestions;
        } else if upper.starts_with("TOOL_SUGGESTIONS:") || upper.starts_with("TOOL SUGGESTIONS:") {
            section = Section::ToolSuggestions;
        } else if upper.starts_with("PARAM_VALIDATION:") || upper.starts_with("PARAM VALIDATION:")
        {
            section = Section::ParamValidation;
        } else if let Some(rest) = strip_header(line, &upper, "FEEDBACK:") {
            section = Section::Feedback;
            if !rest.is_empty() {
                feedback_lines.push(rest.to_string());
            }
        } else if let Some(item) = strip_bullet(line) {
            match section {
                Section::Issues => issues.push(item.to_string()),
                Section::Suggestions => suggestions.push(item.to_string()),
                Section::ToolSuggestions => {
                    if let Some(ts) = parse_tool_suggestion(item) {
                        tool_suggestions.push(ts);
                    }
                }
                Section::ParamValidation => {
                    if let Some(pv) = parse_param_validation(item) {
                        param_validation.push(pv);
                    }
                }
                Section::Feedback => feedback_lines.push(item.to_string()),
                Section::None => {} // stray bullet outside any section
            }
        } else if section == Section::Feedback {
            feedback_lines.push(line.to_string());
        }
        // Any other line (model preamble, markdown fences) is ignored.
    }

    let score = score?;

    Some(ReviewVerdict {
        // Missing or unrecognized status degrades to NEEDS_IMPROVEMENT
        status: status.unwrap_or(ReviewStatus::NeedsImprovement),
        score,
        issues,
        suggestions,
        tool_suggestions,
        param_validation,
        feedback: feedback_lines.join("\n"),
    })
}

/// Case-insensitive header match returning the trimmed remainder.
fn strip_header<'a>(line: &'a str, upper: &str, header: &str) -> Option<&'a str> {
    if upper.starts_with(header) {
        Some(line[header.len()..].trim())
    } else {
        None
    }
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim)
}

fn parse_status(text: &str) -> Option<ReviewStatus> {
    let upper = text.to_uppercase();
    if upper.contains("NEEDS_IMPROVEMENT") || upper.contains("NEEDS IMPROVEMENT") {
        Some(ReviewStatus::NeedsImprovement)
    } else if upper.contains("APPROVED") {
        Some(ReviewStatus::Approved)
    } else {
        None
    }
}

/// Extract a 0-100 score. Accepts `82`, `82/100`, or `82 points`; clamps
/// out-of-range values into 0-100.
fn parse_score(text: &str) -> Option<u8> {
    let token = text.split_whitespace().next()?;
    let numeric: String = token
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let value: u32 = numeric.parse().ok()?;
    Some(value.min(100) as u8)
}

/// `tool | params | reason` — missing trailing fields default to empty.
fn parse_tool_suggestion(item: &str) -> Option<ToolSuggestion> {
    let mut parts = item.splitn(3, '|').map(str::trim);
    let tool = parts.next().filter(|t| !t.is_empty())?;
    Some(ToolSuggestion {
        tool: tool.to_string(),
        params: parts.next().unwrap_or("").to_string(),
        reason: parts.next().unwrap_or("").to_string(),
    })
}

/// `tool | param | issue | suggested value` — missing trailing fields default
/// to empty.
fn parse_param_validation(item: &str) -> Option<ParamValidation> {
    let mut parts = item.splitn(4, '|').map(str::trim);
    let tool = parts.next().filter(|t| !t.is_empty())?;
    let param = parts.next().unwrap_or("").to_string();
    Some(ParamValidation {
        tool: tool.to_string(),
        param,
        issue: parts.next().unwrap_or("").to_string(),
        suggested_value: parts.next().unwrap_or("").to_string(),
    })
}
