use super::scoring::Outcome;
use super::session::{RoundResult, Session, SessionSummary};
use crate::scenario::Scenario;

pub const REPORT_LESSONS: usize = 5;
const ALL_CLEAR: &str = "Great job! Keep following policy and best practices.";

/// "Title: pro tip" for the first `limit` rounds answered unsafely or only
/// partially.
pub fn lessons_learned(results: &[RoundResult], deck: &[Scenario], limit: usize) -> Vec<String> {
    let lessons: Vec<String> = results
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Unsafe | Outcome::Partial))
        .take(limit)
        .filter_map(|r| deck.iter().find(|s| s.id == r.scenario_id))
        .map(|s| format!("{}: {}", s.title, s.pro_tip))
        .collect();

    if lessons.is_empty() {
        vec![ALL_CLEAR.to_string()]
    } else {
        lessons
    }
}

pub fn render_report(session: &Session, summary: &SessionSummary, timestamp: &str) -> String {
    let mut out = format!(
        "# Cyber Training Simulator: Summary ({timestamp})\n\n\
         **Score:** {}\n\n\
         **Rounds:** {}\n\n\
         **Most missed:** {}\n",
        summary.score,
        session.rounds_total(),
        summary.most_missed
    );

    if !summary.categories.is_empty() {
        out.push_str("\n## Categories\n\n");
        for (category, tally) in &summary.categories {
            out.push_str(&format!(
                "- {category}: {}/{} ({}%)\n",
                tally.correct,
                tally.total,
                tally.percent()
            ));
        }
    }

    out.push_str("\n## Lessons Learned\n\n");
    for lesson in lessons_learned(session.results(), session.deck(), REPORT_LESSONS) {
        out.push_str(&format!("- {lesson}\n"));
    }
    out.push_str("\n_Data saved locally by the app._\n");
    out
}
