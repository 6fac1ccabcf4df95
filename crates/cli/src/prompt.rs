//! Interactive input on stdin.

use std::io::{self, BufRead, Write};

use parish_client::Confirm;
use secrecy::SecretString;

use crate::error::CliError;

/// Read one line from stdin after writing `label` to stderr.
fn read_line(label: &str) -> io::Result<String> {
    let mut stderr = io::stderr().lock();
    write!(stderr, "{label}")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Password from the flag/env value, or prompted.
pub fn password(given: Option<String>) -> Result<SecretString, CliError> {
    let value = match given {
        Some(value) => value,
        None => read_line("Password: ")?,
    };
    if value.is_empty() {
        return Err(CliError::Invalid("Password must not be empty".into()));
    }
    Ok(SecretString::from(value))
}

/// `y/N` confirmation on stdin; `--yes` skips the prompt.
pub struct StdinConfirm {
    pub assume_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        read_line(&format!("{prompt} [y/N] "))
            .map(|answer| is_yes(&answer))
            .unwrap_or(false)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        assert!(StdinConfirm { assume_yes: true }.confirm("Delete member 1?"));
    }

    #[test]
    fn test_given_password_is_used() {
        use secrecy::ExposeSecret;
        let secret = password(Some("hunter2".into())).unwrap();
        assert_eq!(secret.expose_secret(), "hunter2");
        assert!(password(Some(String::new())).is_err());
    }
}
