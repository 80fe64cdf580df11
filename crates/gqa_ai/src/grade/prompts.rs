pub fn grounding_prompt(question: &str, draft_answer: &str, evidence_blocks: &str) -> String {
    format!(
        r#"You are checking whether an answer is grounded in retrieved evidence.

Rules (non-negotiable):
1) The answer is grounded only if every factual claim in it is supported by the evidence passages below.
2) Ignore style and completeness; judge factual support only.
3) Reply with a single word: yes (grounded) or no (not grounded).

Question:
{question}

Answer under review:
{draft_answer}

Evidence passages:
{evidence_blocks}

Output:
- Return exactly one word: yes or no.
"#
    )
}
