//! Keyword help for the encounter form.
//!
//! An ordered table of keyword sets; the first entry with any keyword found in
//! the question answers it.

pub struct HelpEntry {
    pub keywords: &'static [&'static str],
    pub answer: &'static str,
}

pub const HELP_TABLE: &[HelpEntry] = &[
    HelpEntry {
        keywords: &["allergy", "allergies"],
        answer: "Record allergies in C. History -> Allergies (type + reaction).",
    },
    HelpEntry {
        keywords: &["hpi", "illness"],
        answer: "Fill HPI in C. History -> History of Present Illness.",
    },
    HelpEntry {
        keywords: &["vital", "bp", "hr", "spo2", "temperature"],
        answer: "Enter vitals in D. Vitals.",
    },
    HelpEntry {
        keywords: &["med", "medication", "drug"],
        answer: "Use Medication History in section C for current medications.",
    },
    HelpEntry {
        keywords: &["past medical", "pmh"],
        answer: "Chronic diseases go under Past Medical History.",
    },
    HelpEntry {
        keywords: &["family"],
        answer: "Document hereditary risks in Family History.",
    },
    HelpEntry {
        keywords: &["social"],
        answer: "Record lifestyle details in Social History.",
    },
    HelpEntry {
        keywords: &["exam", "physical"],
        answer: "Document findings in E. Physical Examination.",
    },
    HelpEntry {
        keywords: &["assessment", "plan"],
        answer: "Document diagnosis and treatment in F. Assessment & Plan.",
    },
];

pub const FALLBACK_ANSWER: &str = "I couldn't find an exact match.\n\n\
Try asking things like:\n\
- Where do I enter allergies?\n\
- What is HPI?\n\
- Where do I enter medications?\n\
- How do I fill vitals?";

/// Answer a free-text question from the help table.
pub fn answer(question: &str) -> &'static str {
    let q = question.to_lowercase();
    if q.trim().is_empty() {
        return FALLBACK_ANSWER;
    }
    HELP_TABLE
        .iter()
        .find(|entry| entry.keywords.iter().any(|k| q.contains(k)))
        .map(|entry| entry.answer)
        .unwrap_or(FALLBACK_ANSWER)
}
