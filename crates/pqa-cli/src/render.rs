//! Terminal rendering of a session.
//!
//! The whole page is rebuilt from the cycle outcome after every
//! interaction; nothing here keeps state between renders.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use pqa_client::UNKNOWN_VERSION;
use pqa_core::{ANSWER_LABEL, CycleOutcome, Phase, highlight, resolve};
use pqa_ingest::SiteInfo;
use pqa_model::{AnswerResult, QueryLimits, SessionState};

pub const TITLE: &str = "Privacy Policy Question Answering";
pub const RELOAD_NOTICE: &str =
    "Privacy Policy state information not captured properly. Please reload the page!";
pub const UNSURE_NOTICE: &str = "We are unsure whether the policy document contains an answer \
                                 to your question. Try to reformulate it!";
pub const KEYWORD_HINT: &str = "Note: do not use keywords, but full-fledged questions. The \
                                underlying models are not optimized to deal with keyword \
                                queries and might misunderstand you.";
pub const TAGLINE: &str = "Detecting Textual Saliency in Privacy Policy.";

/// Everything fixed at startup that the page shows next to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub site: Option<SiteInfo>,
    /// The corpus could not be loaded at startup.
    pub reload_notice: bool,
    pub upload_enabled: bool,
    pub limits: QueryLimits,
    pub backend_version: String,
}

impl Page {
    /// Full page for one cycle, with `search_bar` as the question shown.
    pub fn render(&self, outcome: &CycleOutcome, search_bar: &str, show_raw: bool) -> String {
        let mut lines = vec![TITLE.to_string()];
        if self.reload_notice {
            lines.push(format!("error: {RELOAD_NOTICE}"));
        }
        lines.extend(header_lines(self.site.as_ref()));
        lines.push(String::new());
        lines.push(self.options_line(&outcome.state));
        lines.push(question_line(search_bar));
        if let Some(label) = &outcome.state.answer {
            lines.push(format!("Example answer: {label}"));
        }
        lines.push(String::new());

        match outcome.phase {
            Phase::Failed(failure) => lines.push(format!("error: {}", failure.user_message())),
            Phase::PendingRun => lines.push("Press :run to search for this question.".to_string()),
            Phase::Idle | Phase::Running | Phase::Displaying => {}
        }
        if let Some(results) = outcome.state.results() {
            lines.push("Results:".to_string());
            lines.push(results_table(results).to_string());
        }
        if show_raw && let Some(raw) = outcome.state.raw_response() {
            lines.push("REST API JSON response:".to_string());
            lines.push(serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string()));
        }

        lines.push(String::new());
        lines.push(footer_line(&self.backend_version));
        lines.join("\n")
    }

    fn options_line(&self, state: &SessionState) -> String {
        let reader = self.limits.reader_range();
        let retriever = self.limits.retriever_range();
        let mut line = format!(
            "Max. answers: {} ({}-{})  Max. documents from retriever: {} ({}-{})",
            state.params.top_k_reader,
            reader.start(),
            reader.end(),
            state.params.top_k_retriever,
            retriever.start(),
            retriever.end(),
        );
        if self.upload_enabled {
            line.push_str("  File upload: :upload PATH");
        }
        line
    }
}

/// Heading and introduction; names the site when one is known.
pub fn header_lines(site: Option<&SiteInfo>) -> Vec<String> {
    match site {
        Some(site) => {
            let name = site.display_name();
            vec![
                format!("Ask Me Anything about {name}! <{}>", site.url),
                format!(
                    "Ask any question related to privacy practices carried out by {name} that \
                     you'd like to know about! Try :random to see a sample query."
                ),
                KEYWORD_HINT.to_string(),
            ]
        }
        None => vec![
            "Ask Me Anything!".to_string(),
            "Ask any question related to privacy practices carried out by this company that \
             you'd like to know about! Try :random to see a sample query."
                .to_string(),
            KEYWORD_HINT.to_string(),
        ],
    }
}

fn question_line(question: &str) -> String {
    if question.is_empty() {
        "Question: (empty)".to_string()
    } else {
        format!("Question: {question}")
    }
}

/// Context with the answer wrapped in an `ANSWER` annotation.
pub fn annotated_context(result: &AnswerResult) -> String {
    highlight(&result.answer, &result.context)
        .render_with(|matched| format!("[{matched} | {ANSWER_LABEL}]"))
}

pub fn footer_line(version: &str) -> String {
    if version == UNKNOWN_VERSION {
        TAGLINE.to_string()
    } else {
        format!("{TAGLINE} (v{version})")
    }
}

pub fn results_table(results: &[AnswerResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Answer in context"),
        header_cell("Relevance"),
        header_cell("Source"),
    ]);
    apply_results_table_style(&mut table);
    for (rank, result) in results.iter().enumerate() {
        let rank_cell = Cell::new(rank + 1).set_alignment(CellAlignment::Right);
        let relevance_cell = Cell::new(result.relevance).set_alignment(CellAlignment::Right);
        if result.has_answer() {
            table.add_row(vec![
                rank_cell,
                Cell::new(annotated_context(result)),
                relevance_cell,
                Cell::new(resolve(result)),
            ]);
        } else {
            table.add_row(vec![
                rank_cell,
                Cell::new(UNSURE_NOTICE).fg(Color::Yellow),
                relevance_cell,
                Cell::new("-").add_attribute(Attribute::Dim),
            ]);
        }
    }
    table
}

fn apply_results_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Fixed(4)),
        ColumnConstraint::LowerBoundary(Width::Percentage(50)),
        ColumnConstraint::UpperBoundary(Width::Fixed(10)),
        ColumnConstraint::UpperBoundary(Width::Percentage(30)),
    ]);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(answer: &str, context: &str) -> AnswerResult {
        AnswerResult {
            answer: answer.to_string(),
            context: context.to_string(),
            relevance: 91.25,
            document_meta: None,
            fallback_source: "policy.txt".to_string(),
        }
    }

    #[test]
    fn answer_is_annotated_in_place() {
        let text = annotated_context(&result("GDPR", "...We comply with GDPR rules..."));
        assert_eq!(text, "...We comply with [GDPR | ANSWER] rules...");
    }

    #[test]
    fn unmatched_answer_keeps_plain_context() {
        let text = annotated_context(&result("XYZ", "no match here"));
        assert_eq!(text, "no match here");
    }

    #[test]
    fn unknown_version_is_left_out_of_the_footer() {
        assert_eq!(footer_line(UNKNOWN_VERSION), TAGLINE);
        assert!(footer_line("1.3.0").ends_with("(v1.3.0)"));
    }
}
