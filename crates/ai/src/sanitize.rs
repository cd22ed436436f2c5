use once_cell::sync::Lazy;
use regex::Regex;

/// Returned whenever sanitizing leaves nothing usable; callers never see an
/// empty reply.
pub const CLARIFY_FALLBACK: &str =
    "I didn't quite catch that. Could you rephrase what you'd like me to do?";

const MIN_USABLE_CHARS: usize = 8;
const SOFT_CHAR_BUDGET: usize = 1400;

static REASONING_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(think|thinking|analysis|reasoning)>.*?</(think|thinking|analysis|reasoning)>")
        .expect("valid reasoning-block regex")
});
static HEADINGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s*").expect("valid heading regex"));
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").expect("valid bold regex"));
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\n]+)\*|_([^_\n]+)_").expect("valid emphasis regex"));
static LIST_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*[-*+]\s+").expect("valid list-marker regex"));
static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

/// Turn a raw model reply into clean user-presentable text.
pub fn sanitize_response(raw: &str) -> String {
    let text = REASONING_BLOCKS.replace_all(raw, "");
    let text = HEADINGS.replace_all(&text, "");
    let text = BOLD.replace_all(&text, "$1$2");
    let text = EMPHASIS.replace_all(&text, "$1$2");
    let text = LIST_MARKERS.replace_all(&text, "\u{2022} ");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    let text = text.trim();

    if text.chars().count() < MIN_USABLE_CHARS {
        return CLARIFY_FALLBACK.to_string();
    }

    truncate_at_sentence(text, SOFT_CHAR_BUDGET)
}

/// Cut at the sentence boundary nearest to, but not past, `budget` chars.
/// Falls back to a hard cut when no boundary exists in range.
fn truncate_at_sentence(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let clipped: String = text.chars().take(budget).collect();
    let boundary = clipped
        .rmatch_indices(['.', '!', '?'])
        .map(|(i, m)| i + m.len())
        .next();

    match boundary {
        Some(end) => clipped[..end].trim_end().to_string(),
        None => clipped.trim_end().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_reasoning_blocks_entirely() {
        let raw = "<thinking>the user probably wants tasks</thinking>Here is your plan.";
        assert_eq!(sanitize_response(raw), "Here is your plan.");
    }

    #[test]
    fn normalizes_markdown() {
        let raw = "## Today\n**Focus** on the *big* items:\n- write report\n* call bank\n";
        let clean = sanitize_response(raw);
        assert!(!clean.contains('#'));
        assert!(!clean.contains('*'));
        assert!(clean.contains("\u{2022} write report"));
        assert!(clean.contains("\u{2022} call bank"));
    }

    #[test]
    fn collapses_newline_runs() {
        let clean = sanitize_response("First paragraph.\n\n\n\n\nSecond paragraph.");
        assert_eq!(clean, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn empty_input_gets_fallback() {
        assert_eq!(sanitize_response("   "), CLARIFY_FALLBACK);
        assert_eq!(
            sanitize_response("<analysis>only reasoning</analysis>"),
            CLARIFY_FALLBACK
        );
    }

    #[test]
    fn truncates_on_sentence_boundary() {
        let sentence = "This is a complete sentence. ";
        let long: String = sentence.repeat(100);
        let clean = sanitize_response(&long);
        assert!(clean.chars().count() <= 1400);
        assert!(clean.ends_with('.'), "should end on a sentence: ...{}", &clean[clean.len() - 20..]);
    }
}
