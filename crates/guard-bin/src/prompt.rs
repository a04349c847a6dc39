//! Terminal implementation of the recovery prompt.

use guard_storage::RecoveryPrompt;
use std::io::{self, BufRead, Write};

/// Asks on stderr, answers from stdin.
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn ask(&self, question: &str) -> bool {
        eprint!("{} [y/N] ", question);
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

impl RecoveryPrompt for TerminalPrompt {
    fn confirm_emergency_clear(&self, message: &str) -> bool {
        self.ask(message)
    }

    fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn request_reload(&self) {
        eprintln!("Restart any application using this store so it reloads its state.");
    }
}
