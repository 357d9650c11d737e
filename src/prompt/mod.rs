// Prompt assembly
//
// Renders the system prompt and the task-specific user prompt from user
// style configuration and request parameters. Pure string work: no network
// or storage side effects. Prompts are composed by plain concatenation and
// placeholder substitution around const baselines.

use crate::config::constants::{
    FORBIDDEN_PUNCTUATION, STATEMENT_MARKER, THREE_SENTENCE_CHAR_BAND, TWO_SENTENCE_CHAR_BAND,
};
use crate::pipeline::Accomplishment;
use crate::style::StyleConfiguration;

/// Built-in system prompt, used when the user has no custom template.
///
/// Placeholders: `{rank}`, `{primary_verbs}`, `{secondary_verbs}`,
/// `{abbreviations}`.
const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an experienced military performance-statement writer. You draft \
concise, high-impact narrative statements for a {rank}.

Open statements with strong action verbs appropriate for this rank. \
Preferred opening verbs: {primary_verbs}. \
Preferred follow-on verbs: {secondary_verbs}.

Use these abbreviations wherever the full word would appear:
{abbreviations}

Write in plain, direct language. Every statement must pair an action with \
a measurable impact.";

/// Shown in place of the abbreviation list when the user has none.
const NO_ABBREVIATIONS_NOTE: &str =
    "(no abbreviation list configured, spell words out in full)";

/// Request parameters that shape the user prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptParams<'a> {
    /// Sentences per statement (2 or 3); selects the character band.
    pub sentences: u8,
    /// Phrasing versions requested per statement group.
    pub versions: usize,
    /// Statement groups requested from this one call.
    pub groups: usize,
    pub award_level: Option<&'a str>,
    pub period: Option<&'a str>,
}

/// The task-specific portion of a generation prompt.
#[derive(Debug, Clone)]
pub enum PromptMode<'a> {
    /// Merge several accomplishment records into one cohesive statement.
    Combine(&'a [Accomplishment]),
    /// One statement scoped to a single accomplishment.
    PerEntry(&'a Accomplishment),
    /// Extract and enhance accomplishments from unstructured prose.
    CustomContext(&'a str),
    /// Rewrite an existing statement at a given intensity (0–100).
    Revision { statement: &'a str, intensity: u8 },
}

/// Render the system prompt for a user's style configuration and rank.
pub fn build_system_prompt(style: &StyleConfiguration, rank: &str) -> String {
    let template = style
        .system_prompt_template
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    let verbs = style.verbs_for_rank(rank);

    let abbreviations = if style.abbreviations.is_empty() {
        NO_ABBREVIATIONS_NOTE.to_string()
    } else {
        style
            .abbreviations
            .iter()
            .map(|(word, abbr)| format!("\"{word}\" → \"{abbr}\""))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut prompt = template
        .replace("{rank}", rank)
        .replace("{primary_verbs}", &verbs.primary.join(", "))
        .replace("{secondary_verbs}", &verbs.secondary.join(", "))
        .replace("{abbreviations}", &abbreviations);

    if let Some(guidelines) = style.guidelines.as_deref().filter(|g| !g.trim().is_empty()) {
        prompt.push_str("\n\nAdditional style guidelines from the member:\n");
        prompt.push_str(guidelines);
    }

    if !style.examples.is_empty() {
        prompt.push_str("\n\nExample statements to imitate:\n");
        for example in &style.examples {
            let tag = if example.winner { " (award winner)" } else { "" };
            prompt.push_str(&format!("[{}{}] {}\n", example.category, tag, example.text));
        }
    }

    prompt
}

/// Render the task-specific user prompt for a generation mode.
pub fn build_user_prompt(mode: &PromptMode<'_>, params: &PromptParams<'_>) -> String {
    let mut prompt = String::new();

    if let Some(level) = params.award_level {
        prompt.push_str(&format!("These statements support a {level}-level package.\n"));
    }
    if let Some(period) = params.period {
        prompt.push_str(&format!("Rating period: {period}.\n"));
    }

    match mode {
        PromptMode::Combine(accomplishments) => {
            prompt.push_str(
                "Merge the following accomplishment records into cohesive statements. \
                 Where records carry compatible numeric metrics, sum them into a single \
                 figure rather than listing them separately.\n\n",
            );
            for (i, record) in accomplishments.iter().enumerate() {
                prompt.push_str(&format_accomplishment(i + 1, record));
            }
        }
        PromptMode::PerEntry(record) => {
            prompt.push_str(
                "Write statements for the following accomplishment record. \
                 Where it carries compatible numeric metrics, sum them into a single \
                 figure rather than listing them separately.\n\n",
            );
            prompt.push_str(&format_accomplishment(1, record));
        }
        PromptMode::CustomContext(context) => {
            prompt.push_str(
                "Extract the member's accomplishments from the notes below, then \
                 enhance them into polished statements. Keep every fact grounded in \
                 the notes, do not invent numbers.\n\nNotes:\n",
            );
            prompt.push_str(context);
            prompt.push('\n');
        }
        PromptMode::Revision { statement, intensity } => {
            prompt.push_str(revision_instructions(*intensity));
            prompt.push_str("\n\nExisting statement:\n");
            prompt.push_str(statement);
            prompt.push('\n');
        }
    }

    prompt.push('\n');
    prompt.push_str(&output_constraints(params));
    prompt
}

fn format_accomplishment(index: usize, record: &Accomplishment) -> String {
    let mut out = format!("Record {index}: {}\n", record.description);
    if let Some(impact) = record.impact.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push_str(&format!("  Impact: {impact}\n"));
    }
    if let Some(metrics) = record.metrics.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push_str(&format!("  Metrics: {metrics}\n"));
    }
    out
}

/// Map the 0–100 revision intensity dial onto four qualitative bands.
fn revision_instructions(intensity: u8) -> &'static str {
    match intensity {
        0..=25 => {
            "Revise the existing statement minimally. Fix wording and flow only, \
             preserve the structure, facts, and nearly all of the original phrasing."
        }
        26..=50 => {
            "Revise the existing statement lightly. Tighten phrasing and strengthen \
             verbs, but keep the original sentence structure and all facts intact."
        }
        51..=75 => {
            "Revise the existing statement moderately. Rework sentence structure \
             where it helps impact, keep every fact and figure, and preserve the \
             member's voice where you can."
        }
        _ => {
            "Rewrite the statement aggressively. Keep only the underlying facts and \
             figures, and rebuild the phrasing from scratch for maximum impact."
        }
    }
}

/// Hard output constraints appended to every generation prompt, identical
/// across modes.
fn output_constraints(params: &PromptParams<'_>) -> String {
    let (min_chars, max_chars) = match params.sentences {
        2 => TWO_SENTENCE_CHAR_BAND,
        _ => THREE_SENTENCE_CHAR_BAND,
    };
    let forbidden = FORBIDDEN_PUNCTUATION.join(" ");

    format!(
        "Output format, follow exactly:\n\
         - Respond with a valid JSON array of {groups} arrays, each inner array \
           holding {versions} statement strings (distinct phrasings of the same \
           statement).\n\
         - Every statement must start with \"{marker}\".\n\
         - Aim for {sentences} sentences and {min_chars}-{max_chars} characters \
           per statement. The character range matters more than the exact \
           sentence count.\n\
         - Never use any of: {forbidden} (use commas instead).\n\
         - Output only the JSON array, no commentary.",
        groups = params.groups,
        versions = params.versions,
        marker = STATEMENT_MARKER,
        sentences = params.sentences,
    )
}

/// System prompt for the LLM tier of the surgical edit engine.
pub fn build_edit_system_prompt() -> String {
    "You are a surgical text editor. You will be given a document, a target \
     span, and one change to make. Find the target span, apply exactly that \
     one change, and return the entire document otherwise verbatim, \
     character for character.\n\n\
     Respond with a single JSON object and nothing else:\n\
     {\"success\": true, \"newText\": \"<the full edited document>\"}\n\
     or, if you cannot locate the target span:\n\
     {\"success\": false, \"aborted\": true, \"reason\": \"<why>\"}"
        .to_string()
}

/// User prompt for the LLM tier of the surgical edit engine.
pub fn build_edit_user_prompt(
    current_text: &str,
    highlighted_text: &str,
    replacement_text: Option<&str>,
) -> String {
    let instruction = match replacement_text {
        Some(replacement) => format!(
            "Replace the target span with: \"{replacement}\"\n\
             The span may have been partially edited already, use surrounding \
             context to locate it."
        ),
        None => "Delete the target span. The span may have been partially edited \
                 already, use surrounding context to locate it."
            .to_string(),
    };

    format!(
        "Document:\n{current_text}\n\nTarget span:\n{highlighted_text}\n\n{instruction}"
    )
}

/// Prompt for sentence-count conversion of a single statement.
pub fn build_convert_prompt(statement: &str, target_sentences: u8, versions: usize) -> String {
    let (min_chars, max_chars) = match target_sentences {
        2 => TWO_SENTENCE_CHAR_BAND,
        _ => THREE_SENTENCE_CHAR_BAND,
    };

    format!(
        "Rewrite the statement below as exactly {target_sentences} sentences, \
         preserving every fact and figure. Produce {versions} distinct \
         rewrites.\n\n\
         Statement:\n{statement}\n\n\
         Respond with a valid JSON array of {versions} strings. Each rewrite \
         must start with \"{marker}\", stay within {min_chars}-{max_chars} \
         characters, and avoid {forbidden} in favor of commas. Output only \
         the JSON array.",
        marker = STATEMENT_MARKER,
        forbidden = FORBIDDEN_PUNCTUATION.join(" "),
    )
}
