//! Line tokenizing and background-marker handling.

use crate::error::{Result, ShellError};

pub const COMMAND_MAX_LENGTH: usize = 80;
pub const COMMAND_MAX_ARGS: usize = 20;

const BACKGROUND_SIGN: char = '&';

/// True when the last non-whitespace character is `&`.
pub fn is_background(line: &str) -> bool {
    line.trim_end().ends_with(BACKGROUND_SIGN)
}

/// Drops a trailing `&` together with the whitespace around it.
pub fn strip_background_sign(line: &str) -> &str {
    let trimmed = line.trim_end();
    match trimmed.strip_suffix(BACKGROUND_SIGN) {
        Some(rest) => rest.trim_end(),
        None => trimmed,
    }
}

/// Checks the line bounds and splits it into words.
pub fn split_args(line: &str) -> Result<Vec<&str>> {
    if line.trim().len() > COMMAND_MAX_LENGTH {
        return Err(ShellError::LineTooLong);
    }
    let args: Vec<_> = line.split_whitespace().collect();
    if args.len() > COMMAND_MAX_ARGS {
        return Err(ShellError::TooManyWords);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_trailing_background_sign() {
        assert!(is_background("sleep 10&"));
        assert!(is_background("sleep 10 &  \t"));
        assert!(!is_background("sleep 10"));
        assert!(!is_background("echo a&b"));
        assert!(!is_background("   "));
    }

    #[test]
    fn strips_only_the_trailing_sign() {
        assert_eq!(strip_background_sign("sleep 10 & "), "sleep 10");
        assert_eq!(strip_background_sign("sleep 10&"), "sleep 10");
        assert_eq!(strip_background_sign("echo a&b"), "echo a&b");
        assert_eq!(strip_background_sign("&"), "");
    }

    #[test]
    fn splits_on_any_whitespace() {
        assert_eq!(
            split_args("  ls\t-l   /tmp ").unwrap(),
            vec!["ls", "-l", "/tmp"]
        );
        assert!(split_args("").unwrap().is_empty());
    }

    #[test]
    fn enforces_line_bounds() {
        let long = "a".repeat(COMMAND_MAX_LENGTH + 1);
        assert!(matches!(split_args(&long), Err(ShellError::LineTooLong)));

        let many = vec!["x"; COMMAND_MAX_ARGS + 1].join(" ");
        assert!(matches!(split_args(&many), Err(ShellError::TooManyWords)));

        let just_enough = vec!["x"; COMMAND_MAX_ARGS].join(" ");
        assert_eq!(split_args(&just_enough).unwrap().len(), COMMAND_MAX_ARGS);
    }
}
