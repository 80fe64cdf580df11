/// Paragraph budget per passage, in characters.
pub const MAX_PASSAGE_CHARS: usize = 1600;

#[derive(Debug, Clone)]
pub struct PassageDraft {
    pub ordinal: u32,
    pub text: String,
}

/// Split normalized text into passages: paragraphs are greedily packed into
/// buffers of at most `max_chars`. A single oversized paragraph becomes its
/// own passage rather than being split mid-sentence.
pub fn split_passages(text: &str, max_chars: usize) -> Vec<PassageDraft> {
    let mut paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    let trimmed = text.trim();
    if paragraphs.is_empty() && !trimmed.is_empty() {
        paragraphs.push(trimmed);
    }

    let mut out = Vec::new();
    let mut ordinal: u32 = 0;
    let mut buf = String::new();
    for p in paragraphs {
        let added = if buf.is_empty() { p.len() } else { 2 + p.len() };
        if !buf.is_empty() && buf.len() + added > max_chars {
            out.push(PassageDraft {
                ordinal,
                text: std::mem::take(&mut buf),
            });
            ordinal += 1;
        }
        if !buf.is_empty() {
            buf.push_str("\n\n");
        }
        buf.push_str(p);
    }
    if !buf.trim().is_empty() {
        out.push(PassageDraft { ordinal, text: buf });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_passage() {
        let drafts = split_passages("one paragraph only", MAX_PASSAGE_CHARS);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].ordinal, 0);
        assert_eq!(drafts[0].text, "one paragraph only");
    }

    #[test]
    fn paragraphs_pack_until_the_budget() {
        let a = "a".repeat(1000);
        let b = "b".repeat(1000);
        let c = "c".repeat(100);
        let text = format!("{a}\n\n{b}\n\n{c}");
        let drafts = split_passages(&text, 1600);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].text, a);
        assert_eq!(drafts[1].text, format!("{b}\n\n{c}"));
        assert_eq!(drafts[1].ordinal, 1);
    }

    #[test]
    fn whitespace_only_text_yields_nothing() {
        assert!(split_passages("  \n\n  ", MAX_PASSAGE_CHARS).is_empty());
    }
}
