use media_cleanup_core::{Confirmer, Error};
use std::io::{self, BufRead, Write};

/// Asks on stdout and reads the answer from stdin. No answer means no.
pub struct PromptConfirmer;

impl Confirmer for PromptConfirmer {
    fn confirm(&self, prompt: &str) -> Result<bool, Error> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        Ok(prompt_confirm(prompt, Some(false), &mut stdin.lock(), &mut stdout)?)
    }
}

pub fn prompt_confirm(
    prompt: &str,
    default: Option<bool>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    let mut line = String::new();

    loop {
        line.clear();

        match default {
            Some(true) => write!(output, "{} [Y/n] ", prompt)?,
            Some(false) | None => write!(output, "{} [y/N] ", prompt)?,
        }
        output.flush()?;

        // EOF: nobody is there to say yes
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(default.unwrap_or(false));
        }

        match line.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
