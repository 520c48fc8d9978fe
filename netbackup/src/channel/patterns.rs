//! Pattern helpers for prompts, pagination markers and command echo.

use regex::bytes::Regex;

/// Compile a prompt pattern string into a regex.
///
/// Anchors to the end of the data (allowing trailing whitespace) unless the
/// pattern already ends with `$`.
pub fn compile_prompt_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let pattern = if pattern.ends_with('$') {
        pattern.to_string()
    } else {
        format!("{}\\s*$", pattern)
    };

    Regex::new(&pattern)
}

/// Build a pattern matching any of the given commands as literal text.
///
/// Returns `None` when there are no non-empty commands.
pub fn echo_pattern<S: AsRef<str>>(commands: &[S]) -> Option<regex::Regex> {
    let alternatives: Vec<String> = commands
        .iter()
        .map(AsRef::as_ref)
        .filter(|cmd| !cmd.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    regex::Regex::new(&alternatives.join("|")).ok()
}
