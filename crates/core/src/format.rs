use std::sync::Arc;

use crate::phrases::{pick, PhrasePicker};
use crate::text::{contains_term, normalize_text};

pub const CLOSING_PHRASES: [&str; 4] =
    ["Does this help?", "Any questions?", "Ready to learn more?", "😊"];

/// Emoji that count as an affirming end of a message.
pub const AFFIRMING_EMOJI: [&str; 2] = ["😊", "🚀"];

/// Name used when the sender did not share one; replies always greet it explicitly.
pub const FALLBACK_RECIPIENT: &str = "there";

/// Normalizes candidate reply text into a personalized, WhatsApp-safe message.
///
/// Length is never enforced here; message ceilings belong to the delivery side.
#[derive(Clone)]
pub struct ResponseFormatter {
    picker: Arc<dyn PhrasePicker>,
}

impl ResponseFormatter {
    pub fn new(picker: Arc<dyn PhrasePicker>) -> Self {
        Self { picker }
    }

    pub fn format(&self, raw_text: &str, recipient_name: &str) -> String {
        let name = recipient_name.trim();
        let mut text = raw_text.trim().to_string();

        if !mentions_recipient(&text, name) {
            text = format!("Hi {name}! 😊 {text}");
        }

        let mut text = collapse_blank_lines(&text).trim().to_string();

        if !has_closing(&text) {
            let closing = pick(self.picker.as_ref(), &CLOSING_PHRASES).unwrap_or(&"😊");
            text.push(' ');
            text.push_str(closing);
        }

        text
    }
}

/// Collapses runs of three or more line breaks (blank or whitespace-only lines between them)
/// into exactly two.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut lines = text.split('\n').peekable();
    let mut blank_run = 0usize;
    let mut first = true;

    while let Some(line) = lines.next() {
        let is_blank = line.trim().is_empty();
        let is_last = lines.peek().is_none();

        if is_blank && !first && !is_last {
            blank_run += 1;
            continue;
        }

        if !first {
            // One separator for the line break itself, one more if any blank lines were
            // skipped.
            output.push('\n');
            if blank_run > 0 {
                output.push('\n');
            }
        }
        blank_run = 0;
        first = false;
        output.push_str(line);
    }

    output
}

fn mentions_recipient(text: &str, name: &str) -> bool {
    if name.eq_ignore_ascii_case(FALLBACK_RECIPIENT) {
        return false;
    }
    contains_term(&normalize_text(text), &normalize_text(name))
}

fn has_closing(text: &str) -> bool {
    text.ends_with('?')
        || text.ends_with('!')
        || AFFIRMING_EMOJI.iter().any(|emoji| text.ends_with(emoji))
}
