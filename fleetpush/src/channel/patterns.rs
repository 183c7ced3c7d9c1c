//! Prompt pattern helpers.

use regex::bytes::Regex;

/// Compile a prompt pattern string into a multiline, end-anchored regex.
///
/// A prompt is only a prompt when nothing but blanks follows it, so
/// patterns without a trailing `$` are anchored to the end of the buffer.
pub fn compile_prompt_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let anchored = if pattern.ends_with('$') {
        pattern.to_string()
    } else {
        format!("{pattern}[ \\t]*\\z")
    };

    Regex::new(&format!("(?m){anchored}"))
}

/// Join several prompt patterns into one alternation.
pub fn combine_prompt_patterns(patterns: &[&str]) -> Result<Regex, regex::Error> {
    let joined = patterns
        .iter()
        .map(|p| {
            let p = p.strip_suffix('$').unwrap_or(p);
            format!("(?:{p})")
        })
        .collect::<Vec<_>>()
        .join("|");

    compile_prompt_pattern(&format!("(?:{joined})"))
}
