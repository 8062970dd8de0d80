//! Plain-text renderers for CLI output.

use crate::domain::{CodeRecord, RiskAssessment, RiskRule, Scope};

/// Maximum characters shown for the long description column.
const LONG_LABEL_WIDTH: usize = 60;

/// `"Showing N of M matching rows."`
pub fn format_caption(shown: usize, total: usize) -> String {
    format!("Showing {} of {} matching rows.", shown.min(total), group_thousands(total))
}

/// Render search results as a fixed-width table, capped at `limit` rows.
pub fn format_search_results(
    rows: &[&CodeRecord],
    scope: Scope,
    query: &str,
    limit: usize,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("Query: {:?} | Scope: {}\n", query, scope.display_name()));
    out.push_str(&format_caption(rows.len().min(limit), rows.len()));
    out.push('\n');

    if rows.is_empty() {
        return out;
    }

    out.push('\n');
    out.push_str(&format!("{:<8} {:<4} {}\n", "CODE", "EXCL", "DESCRIPTION"));
    for r in rows.iter().take(limit) {
        let excl = if r.excluded { "Y" } else { "" };
        out.push_str(&format!(
            "{:<8} {:<4} {}\n",
            r.code,
            excl,
            truncate(&r.long_label, LONG_LABEL_WIDTH)
        ));
    }

    out
}

/// Render a risk assessment with the rules that fired.
pub fn format_assessment(assessment: &RiskAssessment) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Risk tier: {} (score {}/{})\n",
        assessment.tier.display_name(),
        assessment.score,
        RiskRule::ALL.len()
    ));
    for rule in RiskRule::ALL {
        let mark = if assessment.fired.contains(&rule) { "x" } else { " " };
        out.push_str(&format!("  [{mark}] {}\n", rule.description()));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
