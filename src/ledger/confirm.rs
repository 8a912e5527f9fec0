//! Confirmation capability for destructive actions
//!
//! The store never talks to a terminal or dialog directly; callers hand it
//! something that answers a yes/no question.

/// Prompt shown before wiping every entry
pub const CLEAR_ALL_PROMPT: &str = "Apakah Anda yakin ingin menghapus semua data?";

/// Answers a yes/no question
pub trait Confirm {
    /// Return `true` to proceed
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// A fixed answer, for `--yes` style flags and tests
impl Confirm for bool {
    fn confirm(&mut self, _message: &str) -> bool {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_answers() {
        assert!(true.confirm(CLEAR_ALL_PROMPT));
        assert!(!false.confirm(CLEAR_ALL_PROMPT));
    }

    #[test]
    fn test_closure_receives_message() {
        let mut seen = Vec::new();
        let mut prompt = |msg: &str| {
            seen.push(msg.to_string());
            false
        };
        assert!(!prompt.confirm("sure?"));
        assert_eq!(seen, vec!["sure?".to_string()]);
    }
}
