pub const SYSTEM_PROMPT: &str = r#"
You are an expert educator who writes study flashcards.
You always reply with raw JSON and nothing else.
"#;

const USER_PROMPT_HEADER: &str = r#"
Analyze the study text below and create flashcards from it.

- Write clear, concise questions that test understanding
- Provide accurate, complete answers
- Cover the key concepts from the text
- Vary the question styles (definitions, concepts, applications)
"#;

/// Build the user prompt for one generation request. Pure string assembly;
/// the source text is embedded verbatim and the count appears as a literal
/// decimal so the model sees exactly what was asked for.
pub fn build_user_prompt(source_text: &str, card_count: u32) -> String {
    format!(
        "{USER_PROMPT_HEADER}\n\
         TEXT:\n{source_text}\n\n\
         Reply with a JSON array of exactly {card_count} objects, each with exactly \
         the keys \"question\" and \"answer\".\n\
         Do not wrap the array in a code fence or add any surrounding prose.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Machine learning is a subset of artificial intelligence that \
                        enables computers to learn from data.";

    #[test]
    fn prompt_embeds_source_text_verbatim() {
        let prompt = build_user_prompt(TEXT, 10);
        assert!(prompt.contains(TEXT));
    }

    #[test]
    fn prompt_states_the_exact_count() {
        for count in [1_u32, 3, 10, 42, 200] {
            let prompt = build_user_prompt(TEXT, count);
            assert!(
                prompt.contains(&format!("exactly {count} objects")),
                "missing count {count}"
            );
        }
    }

    #[test]
    fn prompt_mandates_the_card_schema() {
        let prompt = build_user_prompt(TEXT, 5);
        assert!(prompt.contains("JSON array"));
        assert!(prompt.contains("\"question\""));
        assert!(prompt.contains("\"answer\""));
        assert!(prompt.contains("code fence"));
    }

    #[test]
    fn prompt_asks_for_varied_question_styles() {
        let prompt = build_user_prompt(TEXT, 5);
        assert!(prompt.contains("definitions"));
        assert!(prompt.contains("applications"));
    }

    #[test]
    fn multiline_text_survives_unchanged() {
        let text = "Line one about mitosis.\n\nLine two about meiosis, with enough \
                    detail to matter.";
        let prompt = build_user_prompt(text, 2);
        assert!(prompt.contains(text));
    }
}
