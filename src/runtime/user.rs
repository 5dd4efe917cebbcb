//! Confirmation prompts.

use anyhow::Result;

use super::RealRuntime;

use std::io::{self, BufRead, Write};

/// Writes `prompt` to `output` and reads one answer line from `input`.
/// Only "y" or "yes" (any case, surrounding blanks ignored) confirm.
pub(crate) fn confirm_with_io<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let response = line.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

impl RealRuntime {
    pub(crate) fn confirm_impl(&self, prompt: &str) -> Result<bool> {
        // Prompts go to stderr so they never mix with command output.
        let stdin = io::stdin();
        let mut stderr = io::stderr();
        let mut stdin_lock = stdin.lock();
        confirm_with_io(prompt, &mut stdin_lock, &mut stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::confirm_with_io;
    use anyhow::Result;
    use std::io::Cursor;

    #[test]
    fn test_confirm_accepts_yes() -> Result<()> {
        for case in ["y\n", "Y\n", "yes\n", " YES \n"] {
            let mut input = Cursor::new(case.as_bytes());
            let mut output = Vec::new();
            assert!(
                confirm_with_io("Continue?", &mut input, &mut output)?,
                "expected '{}' to confirm",
                case
            );
        }
        Ok(())
    }

    #[test]
    fn test_confirm_rejects_everything_else() -> Result<()> {
        for case in ["n\n", "no\n", "\n", "", "sure\n"] {
            let mut input = Cursor::new(case.as_bytes());
            let mut output = Vec::new();
            assert!(
                !confirm_with_io("Continue?", &mut input, &mut output)?,
                "expected '{}' to be rejected",
                case
            );
        }
        Ok(())
    }

    #[test]
    fn test_confirm_writes_prompt() -> Result<()> {
        let mut input = Cursor::new(b"n\n");
        let mut output = Vec::new();
        confirm_with_io("Export survey 4578?", &mut input, &mut output)?;
        assert_eq!(String::from_utf8(output)?, "Export survey 4578? [y/N] ");
        Ok(())
    }
}
