use super::transform_prompt::{TransformPrompt, CTA_HEADER, TITLE_HEADER};
use crate::{limits::CharLimit, policy::ContentPolicy, transformer::FixedFragments};

pub const CURRENT_MESSAGE_HEADER: &str = "# Current message:";
pub const INSTRUCTION_HEADER: &str = "# Edit instruction:";

pub struct RefinementPrompt;

impl RefinementPrompt {
    pub fn system_instruction(
        limit: CharLimit,
        policy: &ContentPolicy,
        fragments: &FixedFragments,
    ) -> String {
        let mut instruction = format!(
            r#"You are a professional editor of chat messages helping a user revise one message. Each user turn contains the current version of the message followed by an edit instruction. The current version in the turn is authoritative: the user may have edited it by hand, so never rely on earlier versions from this conversation.

Apply the instruction and reply with the complete revised message, never a diff or a partial excerpt. Every reply must keep following these rules, in priority order:
{rules}

Reply with the message only, with no explanations or extra text. Do not use markdown or code blocks."#,
            rules = TransformPrompt::rules(limit, policy),
        );

        if !fragments.is_empty() {
            instruction.push_str(
                "\n\nThe fixed fragments of this message are listed below. They apply to every reply, whatever the instruction says.\n\n",
            );
            instruction.push_str(Self::fragment_sections(fragments).trim_end());
        }

        instruction
    }

    /// First exchange of a session, giving the model the freshly generated
    /// message.
    pub fn priming_turn(artifact: &str, fragments: &FixedFragments) -> String {
        format!(
            "{}{}\n{}\n\nThis is the message we will be editing. Reply with it unchanged to confirm.",
            Self::fragment_sections(fragments),
            CURRENT_MESSAGE_HEADER,
            artifact
        )
    }

    pub fn instruction_turn(
        artifact: &str,
        instruction: &str,
        limit: CharLimit,
        fragments: &FixedFragments,
    ) -> String {
        let mut placement = String::new();
        if fragments.title.is_some() {
            placement.push_str("Start the message with the title exactly as given. ");
        }
        if fragments.cta.is_some() {
            placement.push_str("End the message with the call to action exactly as given. ");
        }

        format!(
            "{}{}\n{}\n\n{}\n{}\n\n{}Apply the instruction to the current message and reply with the complete revised message, at most {} characters.",
            Self::fragment_sections(fragments),
            CURRENT_MESSAGE_HEADER,
            artifact,
            INSTRUCTION_HEADER,
            instruction,
            placement,
            limit
        )
    }

    /// `# Title:` and `# Call to action:` sections for the fragments that are
    /// present, each followed by a blank line.
    fn fragment_sections(fragments: &FixedFragments) -> String {
        let mut sections = String::new();
        if let Some(title) = &fragments.title {
            sections.push_str(&format!("{}\n{}\n\n", TITLE_HEADER, title));
        }
        if let Some(cta) = &fragments.cta {
            sections.push_str(&format!("{}\n{}\n\n", CTA_HEADER, cta));
        }
        sections
    }
}
