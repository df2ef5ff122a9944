use crate::config::ANSWER_SNIPPET_CHARS;
use crate::retrieval::RetrievedItem;

pub const NOT_FOUND: &str = "I could not find relevant information in the knowledge base.";
const INTRO: &str = "Here is what I found:";
const ELLIPSIS: char = '…';

/// Renders ranked passages as a bulleted plain-text answer, in input order.
pub fn synthesize(items: &[RetrievedItem]) -> String {
    if items.is_empty() {
        return NOT_FOUND.to_string();
    }

    let mut answer = INTRO.to_string();
    for item in items {
        answer.push_str(&format!(
            "\n- ({}/{}) {}",
            item.domain,
            item.lang,
            clamp(&item.text, ANSWER_SNIPPET_CHARS)
        ));
    }
    answer
}

/// Trims, then keeps at most `max_chars` characters, marking any cut.
fn clamp(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((end, _)) => {
            let mut out = text[..end].to_string();
            out.push(ELLIPSIS);
            out
        }
    }
}
