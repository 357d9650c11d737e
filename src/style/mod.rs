// Per-user statement style configuration
//
// Owned by the user record and mutated elsewhere (settings UI); the
// generation core only ever reads it. Absent fields fall back to built-in
// defaults at prompt-assembly time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A curated example statement the user wants the model to imitate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleStatement {
    pub text: String,
    pub category: String,
    /// Whether the package containing this statement won at some level.
    #[serde(default)]
    pub winner: bool,
}

/// Action-verb lists for one rank tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerbSet {
    /// Verbs for the opening of a statement.
    pub primary: Vec<String>,
    /// Verbs for follow-on sentences.
    pub secondary: Vec<String>,
}

/// Snapshot of one user's style settings.
///
/// Fetched once per request by the caller and threaded down into the
/// prompt assembler; the core never reads it ambiently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleConfiguration {
    /// Custom system-prompt template. Supports the placeholders
    /// `{rank}`, `{primary_verbs}`, `{secondary_verbs}`, `{abbreviations}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_template: Option<String>,

    /// Rank-keyed verb overrides; ranks not listed use the built-in table.
    #[serde(default)]
    pub verbs_by_rank: BTreeMap<String, VerbSet>,

    /// Word → abbreviation mapping rendered into the system prompt.
    #[serde(default)]
    pub abbreviations: BTreeMap<String, String>,

    /// Free-text style guidelines appended to the system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<String>,

    /// Curated example statements tagged by category and win status.
    #[serde(default)]
    pub examples: Vec<ExampleStatement>,
}

impl StyleConfiguration {
    /// Verb set for a rank: user override first, then the built-in table.
    pub fn verbs_for_rank(&self, rank: &str) -> VerbSet {
        if let Some(set) = self.verbs_by_rank.get(rank) {
            return set.clone();
        }
        builtin_verbs_for_rank(rank)
    }
}

/// Rank tiers with distinct verb vocabularies.
///
/// A junior enlisted member "executed" a task; a senior NCO or officer
/// "directed" it. Statements that get the tier wrong read as padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RankTier {
    Junior,
    Nco,
    SeniorNco,
    Officer,
}

fn tier_for_rank(rank: &str) -> RankTier {
    let normalized = rank.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "ab" | "amn" | "a1c" | "sra" => RankTier::Junior,
        "ssgt" | "tsgt" => RankTier::Nco,
        "msgt" | "smsgt" | "cmsgt" => RankTier::SeniorNco,
        "2d lt" | "1st lt" | "capt" | "maj" | "lt col" | "col" => RankTier::Officer,
        // Unknown ranks get mid-tier verbs rather than failing.
        _ => RankTier::Nco,
    }
}

fn builtin_verbs_for_rank(rank: &str) -> VerbSet {
    let (primary, secondary): (&[&str], &[&str]) = match tier_for_rank(rank) {
        RankTier::Junior => (
            &["Executed", "Performed", "Completed", "Supported", "Maintained"],
            &["Aided", "Assisted", "Sustained", "Contributed to"],
        ),
        RankTier::Nco => (
            &["Led", "Managed", "Trained", "Coordinated", "Supervised"],
            &["Guided", "Mentored", "Streamlined", "Enforced"],
        ),
        RankTier::SeniorNco => (
            &["Directed", "Drove", "Spearheaded", "Orchestrated", "Championed"],
            &["Shaped", "Advanced", "Institutionalized", "Galvanized"],
        ),
        RankTier::Officer => (
            &["Commanded", "Directed", "Spearheaded", "Architected", "Forged"],
            &["Steered", "Advocated", "Postured", "Synchronized"],
        ),
    };

    VerbSet {
        primary: primary.iter().map(|s| s.to_string()).collect(),
        secondary: secondary.iter().map(|s| s.to_string()).collect(),
    }
}
