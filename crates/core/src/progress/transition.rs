use std::fmt;

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The quick-check or scenario was already revealed; its answer is frozen.
    AlreadyRevealed,
    NoAnswerSelected,
    /// The current lesson does not meet the completion rule yet.
    LessonIncomplete,
    /// An earlier lesson is still incomplete.
    LessonLocked,
    ScenariosLocked,
    NoActionSelected,
    NotRevealed,
    AtBoundary,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::AlreadyRevealed => "already revealed",
            Rejection::NoAnswerSelected => "no answer selected",
            Rejection::LessonIncomplete => "lesson incomplete",
            Rejection::LessonLocked => "lesson locked",
            Rejection::ScenariosLocked => "scenarios locked",
            Rejection::NoActionSelected => "no action selected",
            Rejection::NotRevealed => "not revealed",
            Rejection::AtBoundary => "at boundary",
        };
        f.write_str(text)
    }
}

/// Outcome of a progression operation.
///
/// Anything other than `Applied` leaves the state untouched, so callers that
/// ignore the value get silent no-op behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The preconditions held but the state already matched the request.
    Unchanged,
    Rejected(Rejection),
    /// An id did not resolve against the course content.
    NotFound,
}

impl Transition {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Transition::Applied)
    }

    #[must_use]
    pub fn rejection(self) -> Option<Rejection> {
        match self {
            Transition::Rejected(reason) => Some(reason),
            _ => None,
        }
    }

    pub(crate) fn traced(self, operation: &'static str) -> Self {
        match self {
            Transition::Applied => tracing::debug!(operation, "transition applied"),
            Transition::Unchanged => tracing::trace!(operation, "transition unchanged"),
            Transition::Rejected(reason) => {
                tracing::debug!(operation, %reason, "transition rejected");
            }
            Transition::NotFound => tracing::debug!(operation, "transition target not found"),
        }
        self
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Applied => f.write_str("applied"),
            Transition::Unchanged => f.write_str("unchanged"),
            Transition::Rejected(reason) => write!(f, "rejected ({reason})"),
            Transition::NotFound => f.write_str("not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_applied_counts_as_applied() {
        assert!(Transition::Applied.is_applied());
        assert!(!Transition::Unchanged.is_applied());
        assert!(!Transition::NotFound.is_applied());
        assert_eq!(
            Transition::Rejected(Rejection::ScenariosLocked).rejection(),
            Some(Rejection::ScenariosLocked)
        );
    }

    #[test]
    fn display_names_the_reason() {
        let t = Transition::Rejected(Rejection::LessonIncomplete);
        assert_eq!(t.to_string(), "rejected (lesson incomplete)");
    }
}
