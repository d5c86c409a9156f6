use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub const SEMANTIC_SYSTEM: &str = JSON_ONLY_SYSTEM;

/// Relevance judgement prompt. Placeholders: `{job_text}`, `{candidate_text}`.
pub const SEMANTIC_PROMPT_TEMPLATE: &str = r#"
Rate how relevant the candidate's experience is to the job below.

Judge context, not keyword counts: comparable responsibilities, domain, scale and
seniority all count. Do NOT reward buzzwords that are not backed by described work.
Missing information counts against the candidate; do not assume.

Return JSON exactly in this shape:
{"score": <number 0-100>, "rationale": "<one sentence>"}

JOB:
"""{job_text}"""

CANDIDATE:
"""{candidate_text}"""
"#;

/// Fills the template in a single pass, so placeholder-like text inside either
/// input is copied verbatim.
pub fn render_semantic_prompt(job_text: &str, candidate_text: &str) -> String {
    let placeholders = [("{job_text}", job_text), ("{candidate_text}", candidate_text)];
    let template = SEMANTIC_PROMPT_TEMPLATE.trim_start();

    let mut prompt = String::with_capacity(template.len() + job_text.len() + candidate_text.len());
    let mut rest = template;
    'scan: while let Some(ch) = rest.chars().next() {
        for (key, value) in placeholders {
            if let Some(after) = rest.strip_prefix(key) {
                prompt.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        prompt.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    prompt
}
