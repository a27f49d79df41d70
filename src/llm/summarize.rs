//! One-shot transcript summarization.
//!
//! The summarizer is stateless request/response: it builds a fixed
//! instruction template classified by the age span of the content, dispatches
//! to the backend, and returns prose. Backend failures are converted into an
//! error-text return value and never raised, so a failed summary does not
//! abort a session that might still want to continue interactively.

use crate::llm::ModelBackend;

/// Summary style selected from the number of days the content spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySpan {
    /// 0–2 days: focused event update
    EventUpdate,
    /// 3–7 days: periodic digest
    PeriodicDigest,
    /// 8+ days: comprehensive status summary
    FullStatus,
}

impl SummarySpan {
    /// Classifies a lookback span in days.
    pub fn classify(days: i64) -> Self {
        match days {
            i64::MIN..=2 => SummarySpan::EventUpdate,
            3..=7 => SummarySpan::PeriodicDigest,
            _ => SummarySpan::FullStatus,
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            SummarySpan::EventUpdate => {
                "Produce an Event Update:\n\
                 - Focus on what was done, what remains open, and immediate actionables.\n\
                 - Capture individual contributions: who did or said what.\n\
                 - Highlight assumptions, decisions, data sources, or constraints discussed.\n\
                 - Flag anything time-sensitive or urgent.\n\
                 - Write in bullet points grouped under clear headings like \
                   \"Completed\", \"Open Actions\", \"Contributors\", \"Notes\"."
            }
            SummarySpan::PeriodicDigest => {
                "Produce a Periodic Digest:\n\
                 - Focus on trends, major developments, and overall movement.\n\
                 - Summarize key achievements and broader tasks or challenges.\n\
                 - Group contributions by theme or workstream rather than by individual post.\n\
                 - Identify emerging risks, open technical questions, and strategic discussions.\n\
                 - Keep it compact but higher-level, suitable for someone catching up \
                   after a few days away."
            }
            SummarySpan::FullStatus => {
                "Produce a Full Status Summary:\n\
                 - Answer first: what is this conversation about? Infer it from the content.\n\
                 - Then cover completed tasks and milestones, outstanding tasks and blockers, \
                   key contributions and who made them, and any risks or open uncertainties.\n\
                 - Infer roles where possible (e.g. lead, technical expert, client).\n\
                 - Organize in clear sections and bullet points.\n\
                 - Make the summary self-contained so someone unfamiliar with recent \
                   details can quickly understand the state of the discussion."
            }
        }
    }
}

const GENERAL_INSTRUCTIONS: &str = "General writing instructions:\n\
    - Maintain a professional, internal tone appropriate for status updates.\n\
    - Be specific but brief; avoid unnecessary commentary.\n\
    - Omit sections that are not applicable.\n\
    - Use markdown headings and bullet points for readability.\n\
    - Refer to users only by their ID tokens (like <@123456789012345678>), \
      never by name.";

/// Stateless summarization engine over a model backend.
pub struct Summarizer<'a> {
    backend: &'a dyn ModelBackend,
}

impl<'a> Summarizer<'a> {
    /// Creates a summarizer dispatching to the given backend.
    pub fn new(backend: &'a dyn ModelBackend) -> Self {
        Self { backend }
    }

    /// Builds the system instructions for a span classification.
    pub fn system_prompt(span: SummarySpan) -> String {
        format!(
            "You are an expert summarizer for internal chat channels. Your task is to \
             read a sequence of messages and generate a clear, structured summary that \
             captures the current state of the conversation.\n\n{}\n\n{}",
            span.instructions(),
            GENERAL_INSTRUCTIONS
        )
    }

    /// Generates a summary of the transcript.
    ///
    /// Never fails: a backend error is rendered as error text so callers can
    /// keep going.
    pub fn generate_summary(&self, transcript: &str, span: SummarySpan) -> String {
        let system = Self::system_prompt(span);
        let user = format!("Here is the chat history to summarize:\n\n{transcript}");

        match self.backend.complete(&system, &user) {
            Ok(summary) => summary,
            Err(e) => format!("Error generating summary: {e}"),
        }
    }
}
