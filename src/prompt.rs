use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Prompt user with a message and return their trimmed input.
pub fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
pub fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    Ok(or_default(input, default))
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
pub fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    Ok(parse_yes_no(&input, default_yes))
}

fn or_default(input: String, default: &str) -> String {
    if input.is_empty() {
        default.to_string()
    } else {
        input
    }
}

fn parse_yes_no(input: &str, default_yes: bool) -> bool {
    let input = input.to_lowercase();
    if input.is_empty() {
        default_yes
    } else {
        input == "y" || input == "yes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_no_parsing() {
        assert!(parse_yes_no("", true));
        assert!(!parse_yes_no("", false));
        assert!(parse_yes_no("Yes", false));
        assert!(!parse_yes_no("nope", true));
    }

    #[test]
    fn test_default_applies_to_empty_input() {
        assert_eq!(or_default(String::new(), "acme/widgets"), "acme/widgets");
        assert_eq!(or_default("o/r".to_string(), "acme/widgets"), "o/r");
    }
}
