pub fn answer_prompt(question: &str, evidence_blocks: &str) -> String {
    // Keep the contract explicit:
    // - Use ONLY evidence provided.
    // - Must include inline citations as [[passage:<passage_id>]].
    // - If evidence is insufficient, say so instead of guessing.
    format!(
        r#"You are answering a user question from retrieved evidence.

Rules (non-negotiable):
1) Use ONLY the evidence passages provided below. Do not invent facts.
2) Every concrete claim MUST include an inline citation marker in the form [[passage:<passage_id>]].
3) If the evidence does not answer the question, reply exactly: I cannot answer this from the available evidence.
4) Keep the answer concise: one to three sentences.

Question:
{question}

Evidence passages:
{evidence_blocks}

Output:
- Return plain text only.
- Include inline citations as specified.
"#
    )
}
