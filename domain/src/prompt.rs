//! Prompt templates for the agent pipeline
//!
//! All model-facing wording lives here so the use cases stay free of string
//! assembly. The improvement prompt keeps the original question as the
//! primary instruction — reviewer guidance is appended, never substituted.

use crate::evidence::EvidenceFragment;
use crate::review::verdict::ReviewVerdict;
use crate::tool::entities::ToolSpec;
use crate::util::truncate;

/// Templates for generating agent prompts
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// Router prompt: constrained two-label classification of a single
    /// utterance. History is deliberately absent so classification cannot
    /// drift based on earlier unrelated turns.
    pub fn router(utterance: &str) -> String {
        format!(
            r#"Classify the following user message.

Answer with exactly one word:
- EVIDENCE if answering requires looking up procurement notice documents
- CHAT if it is general conversation (greetings, thanks, meta questions)

Message: {utterance}

Label:"#,
            utterance = utterance
        )
    }

    /// Relevance grading prompt for a single retrieved fragment.
    pub fn grade_fragment(query: &str, fragment: &EvidenceFragment) -> String {
        format!(
            r#"Does the following passage from a procurement notice help answer the question?

Question: {query}

Passage ({section}):
{text}

Answer with exactly one word: YES or NO."#,
            query = query,
            section = fragment.section_label,
            text = truncate(&fragment.text, 1500),
        )
    }

    /// System prompt for the answer generator, rendering the tool registry.
    pub fn answer_system(tool_spec: &ToolSpec) -> String {
        let tool_descriptions = tool_spec
            .all()
            .map(|t| {
                let params = t
                    .parameters
                    .iter()
                    .map(|p| {
                        let required = if p.required { " (required)" } else { "" };
                        format!("    - {}: {}{}", p.name, p.description, required)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("- **{}**: {}\n  Parameters:\n{}", t.name, t.description, params)
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are an assistant answering questions about public procurement notices.

Ground every factual claim in the evidence passages or tool results provided.
If the information needed is not present, say so explicitly instead of guessing —
stating that a figure is unavailable is a correct answer; inventing one is not.

## Available Tools

{tool_descriptions}

Call a tool when the evidence passages are insufficient and a tool can supply
the missing record. Otherwise answer directly and cite the notice ids you used."#,
            tool_descriptions = tool_descriptions
        )
    }

    /// Render retrieved evidence as a block for the generation prompt.
    pub fn evidence_block(fragments: &[EvidenceFragment]) -> String {
        if fragments.is_empty() {
            return "No relevant passages were found in the notice corpus for this question."
                .to_string();
        }
        fragments
            .iter()
            .map(|f| {
                format!(
                    "[{} | {} | {}]\n{}",
                    f.id, f.source_document_id, f.section_label, f.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// User prompt for answer generation. `improvement_context`, when
    /// present, is appended after the question — the question stays primary.
    pub fn answer(question: &str, evidence: &[EvidenceFragment], improvement_context: Option<&str>) -> String {
        let mut prompt = format!(
            r#"## Evidence

{evidence}

## Question

{question}"#,
            evidence = Self::evidence_block(evidence),
            question = question,
        );

        if let Some(context) = improvement_context {
            prompt.push_str("\n\n## Additional guidance from review\n\n");
            prompt.push_str(context);
            prompt.push_str(
                "\n\nThe question above remains the primary instruction; \
                 use this guidance to improve the answer to it.",
            );
        }

        prompt
    }

    /// Improvement context assembled from a rejecting verdict.
    pub fn improvement_context(prior_answer: &str, verdict: &ReviewVerdict) -> String {
        let mut sections = vec![format!(
            "Your previous answer scored {}/100 and was not approved.",
            verdict.score
        )];

        if !verdict.issues.is_empty() {
            sections.push(format!("Issues found:\n{}", bullet_list(&verdict.issues)));
        }
        if !verdict.suggestions.is_empty() {
            sections.push(format!(
                "Suggestions:\n{}",
                bullet_list(&verdict.suggestions)
            ));
        }
        if !verdict.tool_suggestions.is_empty() {
            let lines: Vec<String> = verdict
                .tool_suggestions
                .iter()
                .map(|t| format!("- call {} with {} ({})", t.tool, t.params, t.reason))
                .collect();
            sections.push(format!("Tool calls to consider:\n{}", lines.join("\n")));
        }
        if !verdict.param_validation.is_empty() {
            let lines: Vec<String> = verdict
                .param_validation
                .iter()
                .map(|p| {
                    format!(
                        "- {}.{}: {} (suggested: {})",
                        p.tool, p.param, p.issue, p.suggested_value
                    )
                })
                .collect();
            sections.push(format!("Parameter problems:\n{}", lines.join("\n")));
        }
        if !verdict.feedback.is_empty() {
            sections.push(format!("Reviewer feedback:\n{}", verdict.feedback));
        }

        sections.push(format!(
            "Previous answer for reference:\n{}",
            truncate(prior_answer, 2000)
        ));

        sections.join("\n\n")
    }

    /// Reviewer prompt. Includes what the draft actually used (documents and
    /// tools), plus the shared tool schema list, so the reviewer can validate
    /// process as well as content.
    pub fn review(
        question: &str,
        history_digest: &str,
        candidate_answer: &str,
        documents_used: &[EvidenceFragment],
        tools_used: &[String],
        available_tools: &ToolSpec,
        approval_threshold: u8,
    ) -> String {
        let documents = if documents_used.is_empty() {
            "(none — no evidence was retrieved)".to_string()
        } else {
            documents_used
                .iter()
                .map(|f| format!("- {}", f.summary()))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let tools = if tools_used.is_empty() {
            "(none)".to_string()
        } else {
            tools_used
                .iter()
                .map(|t| format!("- {}", t))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let tool_names = available_tools.names().collect::<Vec<_>>().join(", ");

        format!(
            r#"You are an independent reviewer scoring a draft answer about procurement notices.

Evaluate correctness, grounding in the listed evidence, and whether the right
tools were used with sane parameters. An answer that correctly discloses that
requested information is unavailable should NOT be penalized for lacking a
figure. Score 0-100; a score of {threshold} or above means APPROVED, below
means NEEDS_IMPROVEMENT — keep STATUS and SCORE consistent.

## Question

{question}

## Conversation context

{history}

## Draft answer

{answer}

## Evidence the draft used

{documents}

## Tools the draft called

{tools}

## Tools that were available

{tool_names}

Respond in exactly this format:

STATUS: APPROVED or NEEDS_IMPROVEMENT
SCORE: <0-100>
ISSUES:
- <one per line, omit section if none>
SUGGESTIONS:
- <one per line, omit section if none>
TOOL_SUGGESTIONS:
- <tool> | <params> | <reason>
PARAM_VALIDATION:
- <tool> | <param> | <issue> | <suggested value>
FEEDBACK: <overall assessment>"#,
            threshold = approval_threshold,
            question = question,
            history = if history_digest.is_empty() {
                "(no prior turns)"
            } else {
                history_digest
            },
            answer = candidate_answer,
            documents = documents,
            tools = tools,
            tool_names = if tool_names.is_empty() {
                "(none)".to_string()
            } else {
                tool_names
            },
        )
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::verdict::ReviewStatus;
    use crate::tool::entities::{ToolDefinition, ToolParameter};

    #[test]
    fn test_router_prompt_contains_only_current_utterance() {
        let prompt = AgentPromptTemplate::router("What is the budget of notice X?");
        assert!(prompt.contains("What is the budget of notice X?"));
        assert!(prompt.contains("EVIDENCE"));
        assert!(prompt.contains("CHAT"));
    }

    #[test]
    fn test_answer_prompt_keeps_question_before_guidance() {
        let prompt = AgentPromptTemplate::answer("the question", &[], Some("the guidance"));
        let q = prompt.find("the question").unwrap();
        let g = prompt.find("the guidance").unwrap();
        assert!(q < g, "original question must precede improvement guidance");
        assert!(prompt.contains("primary instruction"));
    }

    #[test]
    fn test_evidence_block_empty() {
        let block = AgentPromptTemplate::evidence_block(&[]);
        assert!(block.contains("No relevant passages"));
    }

    #[test]
    fn test_improvement_context_includes_verdict_sections() {
        let verdict = ReviewVerdict {
            status: ReviewStatus::NeedsImprovement,
            score: 55,
            issues: vec!["not grounded".to_string()],
            suggestions: vec!["cite the notice".to_string()],
            tool_suggestions: Vec::new(),
            param_validation: Vec::new(),
            feedback: "be precise".to_string(),
        };
        let context = AgentPromptTemplate::improvement_context("old answer", &verdict);
        assert!(context.contains("55/100"));
        assert!(context.contains("not grounded"));
        assert!(context.contains("cite the notice"));
        assert!(context.contains("be precise"));
        assert!(context.contains("old answer"));
    }

    #[test]
    fn test_review_prompt_lists_usage_and_schema() {
        let spec = ToolSpec::new().register(
            ToolDefinition::new("get_notice_details", "Fetch notice")
                .with_parameter(ToolParameter::new("notice_id", "Notice id", true)),
        );
        let prompt = AgentPromptTemplate::review(
            "q",
            "",
            "draft",
            &[],
            &["get_notice_details".to_string()],
            &spec,
            75,
        );
        assert!(prompt.contains("STATUS:"));
        assert!(prompt.contains("75"));
        assert!(prompt.contains("get_notice_details"));
        assert!(prompt.contains("no evidence was retrieved"));
    }
}
