use crate::{limits::CharLimit, policy::ContentPolicy};

pub const TITLE_HEADER: &str = "# Title:";
pub const SOURCE_HEADER: &str = "# Source text:";
pub const CTA_HEADER: &str = "# Call to action:";
pub const RULES_HEADER: &str = "# Rules:";

pub struct TransformPrompt;

impl TransformPrompt {
    pub fn get_prompt(
        source_text: &str,
        title: Option<&str>,
        cta: Option<&str>,
        limit: CharLimit,
        policy: &ContentPolicy,
    ) -> String {
        let mut segments = vec![
            "You are a professional editor of chat messages. Rewrite the material below into a single message that is ready to share in a messaging app, following every rule under \"Rules\".".to_string(),
        ];

        if let Some(title) = title {
            segments.push(format!("\n{}\n{}", TITLE_HEADER, title));
        }

        segments.push(format!("\n{}\n{}", SOURCE_HEADER, source_text));

        if let Some(cta) = cta {
            segments.push(format!("\n{}\n{}", CTA_HEADER, cta));
        }

        segments.push(format!("\n{}\n{}", RULES_HEADER, Self::rules(limit, policy)));

        segments.push(
            r#"
# Output:
Return only the edited message, with no explanations or extra text. Do not use markdown or code blocks. Plain text only."#
                .to_string(),
        );

        segments.join("\n")
    }

    /// The ordered policy shared by the first generation and every refinement
    /// turn. Earlier rules win over later ones.
    pub fn rules(limit: CharLimit, policy: &ContentPolicy) -> String {
        format!(
            r#"1. Fixed fragments: if a title is provided, place it at the very start of the message exactly as given. If a call to action is provided, place it at the very end exactly as given. Never reword, shorten or decorate either of them.
2. Hard length limit: the entire message (title, body, call to action, every line break and every emoji) must be at most {limit} characters. Each emoji counts as exactly one character. Exceeding the limit by even one character is not acceptable, and this rule takes priority over every other rule.
3. Faithfulness: keep the tone and register of the source text. Do not invent anything. Do not drop substantive information; only redundant wording may be removed.
4. Clean symbols: remove all emoticons and kaomoji such as (^_^) or (T_T), and any decorative or unusual symbols from the source.
5. Punctuation budget: use at most {max_symbols} punctuation marks and common symbols (such as commas, periods, ! and ?) in the whole message, only where they aid clarity.
6. Emoji: you may use emoji to convey content and feeling, but keep them moderate and purposeful. Remember each one counts toward the limit.
7. Readability: group related sentences into one paragraph rather than breaking lines after every phrase."#,
            limit = limit,
            max_symbols = policy.max_symbols,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit() -> CharLimit {
        CharLimit::new(120).unwrap()
    }

    #[test]
    fn fragments_are_embedded_in_order() {
        let prompt = TransformPrompt::get_prompt(
            "We have a new product.",
            Some("✨New arrival✨"),
            Some("Order now 👉 https://example.com"),
            limit(),
            &ContentPolicy::default(),
        );

        let title = prompt.find(TITLE_HEADER).unwrap();
        let source = prompt.find(SOURCE_HEADER).unwrap();
        let cta = prompt.find(CTA_HEADER).unwrap();
        let rules = prompt.find(RULES_HEADER).unwrap();
        assert!(title < source && source < cta && cta < rules);
        assert!(prompt.contains("✨New arrival✨"));
        assert!(prompt.contains("Order now 👉 https://example.com"));
    }

    #[test]
    fn absent_fragments_have_no_section() {
        let prompt =
            TransformPrompt::get_prompt("Body", None, None, limit(), &ContentPolicy::default());

        assert!(!prompt.contains(TITLE_HEADER));
        assert!(!prompt.contains(CTA_HEADER));
    }

    #[test]
    fn limit_and_symbol_budget_are_parameterized() {
        let policy = ContentPolicy::default().with_max_symbols(3);
        let rules = TransformPrompt::rules(limit(), &policy);

        assert!(rules.contains("at most 120 characters"));
        assert!(rules.contains("at most 3 punctuation marks"));
    }
}
