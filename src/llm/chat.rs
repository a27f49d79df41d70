//! Interactive question-answering over a fetched transcript.
//!
//! A session wraps one backend, one transcript, and one user mapping, and
//! accumulates conversation turns across questions. Turn text is kept in raw
//! form (`<@id>` identifiers); display names are restored only when replies
//! are rendered to the terminal. Meta commands (`help`, `users`, `summary`)
//! are answered locally and never become conversation turns.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::identity::UserMapping;
use crate::llm::summarize::{SummarySpan, Summarizer};
use crate::llm::{ConversationTurn, ModelBackend};

/// Why an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed an exit command.
    UserExit,
    /// The input stream closed (end of file).
    InputClosed,
}

const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "q"];

const HELP_TEXT: &str = "Available commands:\n\
    \x20 help     Show this message\n\
    \x20 users    List the users seen in the conversation\n\
    \x20 summary  Generate a summary of the conversation\n\
    \x20 exit     Leave the session (also: quit, q)\n\
    Anything else is sent to the model as a question about the chat history.";

/// A multi-turn Q&A session grounded in one transcript.
pub struct InteractiveSession<'a> {
    backend: &'a dyn ModelBackend,
    transcript: String,
    mapping: &'a UserMapping,
    span_days: i64,
    turns: Vec<ConversationTurn>,
}

impl<'a> InteractiveSession<'a> {
    /// Creates a session over a standardized transcript.
    pub fn new(
        backend: &'a dyn ModelBackend,
        transcript: impl Into<String>,
        mapping: &'a UserMapping,
        span_days: i64,
    ) -> Self {
        Self {
            backend,
            transcript: transcript.into(),
            mapping,
            span_days,
            turns: Vec::new(),
        }
    }

    /// The turns accumulated so far, raw form.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are an assistant answering questions about a chat conversation. \
             Base your answers strictly on the chat history below. If the history \
             does not contain the answer, say so. Refer to users only by their ID \
             tokens (like <@123456789012345678>), never by name.\n\n\
             Chat history:\n\n{}",
            self.transcript
        )
    }

    /// Sends a question to the backend and returns the reply with display
    /// names restored.
    ///
    /// The raw question and raw reply are appended to the turn history only
    /// on success; a failed exchange leaves the history untouched.
    ///
    /// # Errors
    ///
    /// Propagates the backend error unchanged.
    pub fn respond(&mut self, question: &str) -> Result<String> {
        let system = self.system_prompt();
        let reply = self
            .backend
            .complete_with_history(&system, &self.turns, question)?;

        self.turns.push(ConversationTurn::user(question));
        self.turns.push(ConversationTurn::assistant(&reply));
        Ok(self.mapping.restore(&reply))
    }

    fn render_users(&self) -> String {
        let mut pairs: Vec<(&str, &str)> = self.mapping.iter().collect();
        pairs.sort();
        if pairs.is_empty() {
            return "No users found in this conversation.".to_string();
        }
        pairs
            .iter()
            .map(|(name, id)| format!("@{name} (<@{id}>)"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_summary(&self) -> String {
        let summarizer = Summarizer::new(self.backend);
        let span = SummarySpan::classify(self.span_days);
        let summary = summarizer.generate_summary(&self.transcript, span);
        self.mapping.restore(&summary)
    }

    /// Runs the read-eval loop until the user exits or input closes.
    ///
    /// # Errors
    ///
    /// Returns an error only on I/O failure of the output stream; backend
    /// errors are printed and the loop continues.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<SessionEnd> {
        writeln!(
            output,
            "Interactive chat session started. Type 'help' for commands, 'exit' to leave."
        )?;

        for line in input.lines() {
            let line = line?;
            let question = line.trim();
            if question.is_empty() {
                write!(output, "> ")?;
                output.flush()?;
                continue;
            }

            if EXIT_COMMANDS.contains(&question.to_lowercase().as_str()) {
                writeln!(output, "Goodbye!")?;
                return Ok(SessionEnd::UserExit);
            }

            match question.to_lowercase().as_str() {
                "help" => writeln!(output, "{HELP_TEXT}")?,
                "users" => writeln!(output, "{}", self.render_users())?,
                "summary" => {
                    writeln!(output, "{}", "-".repeat(60))?;
                    writeln!(output, "{}", self.render_summary())?;
                    writeln!(output, "{}", "-".repeat(60))?;
                }
                _ => match self.respond(question) {
                    Ok(reply) => writeln!(output, "{reply}")?,
                    Err(e) => writeln!(output, "Error: {e}")?,
                },
            }

            write!(output, "> ")?;
            output.flush()?;
        }

        writeln!(output, "Goodbye!")?;
        Ok(SessionEnd::InputClosed)
    }
}
