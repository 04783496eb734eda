//! Answer span location inside its context.

use std::ops::Range;

/// Annotation label the presentation layer attaches to the matched span.
pub const ANSWER_LABEL: &str = "ANSWER";

/// Context split around the first occurrence of an answer.
///
/// All three parts borrow from the same context buffer, so the split always
/// falls on character boundaries. When the answer does not occur, the whole
/// context is in `prefix` and `matched` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub prefix: &'a str,
    pub matched: &'a str,
    pub suffix: &'a str,
}

impl<'a> Highlight<'a> {
    fn miss(context: &'a str) -> Self {
        Self {
            prefix: context,
            matched: "",
            suffix: "",
        }
    }

    /// False when the answer could not be located; the context should still
    /// be shown, just without a mark.
    pub fn is_marked(&self) -> bool {
        !self.matched.is_empty()
    }

    /// Match position counted in characters rather than bytes.
    pub fn char_span(&self) -> Option<Range<usize>> {
        if !self.is_marked() {
            return None;
        }
        let start = self.prefix.chars().count();
        Some(start..start + self.matched.chars().count())
    }

    /// Reassembles the context with the match replaced by `mark(matched)`.
    pub fn render_with(&self, mark: impl FnOnce(&str) -> String) -> String {
        if !self.is_marked() {
            return self.prefix.to_string();
        }
        format!("{}{}{}", self.prefix, mark(self.matched), self.suffix)
    }
}

/// Splits `context` around the first exact, case-sensitive occurrence of
/// `answer`.
pub fn highlight<'a>(answer: &str, context: &'a str) -> Highlight<'a> {
    if answer.is_empty() {
        return Highlight::miss(context);
    }
    match context.find(answer) {
        Some(start) => {
            let end = start + answer.len();
            Highlight {
                prefix: &context[..start],
                matched: &context[start..end],
                suffix: &context[end..],
            }
        }
        None => Highlight::miss(context),
    }
}
