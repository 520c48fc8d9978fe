//! Removal of login banners and command echo from captured output.

use crate::channel::patterns::echo_pattern;

/// Drop everything up to and including the first echoed command.
///
/// With several commands the earliest occurrence of any of them wins. The
/// remainder has its leading whitespace trimmed. Output that never contains
/// a command is returned unchanged: nothing is discarded unless it can be
/// attributed to echo.
///
/// Apply exactly once per capture; sanitized text may legitimately contain
/// command-like lines.
pub fn sanitize<S: AsRef<str>>(raw: &str, commands: &[S]) -> String {
    match echo_pattern(commands).and_then(|pattern| pattern.find(raw)) {
        Some(m) => raw[m.end()..].trim_start().to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_echo_and_banner() {
        let raw = "show running-config\nhostname R1\n";
        assert_eq!(sanitize(raw, &["show running-config"]), "hostname R1\n");

        let raw = "*** authorised access only ***\nR1#show running-config\n\nhostname R1\n";
        assert_eq!(sanitize(raw, &["show running-config"]), "hostname R1\n");
    }

    #[test]
    fn test_earliest_of_several_commands() {
        let raw = "asa# terminal pager 0\nasa# show running-config\n: Saved\nhostname asa\n";
        let out = sanitize(raw, &["terminal pager 0", "show running-config"]);
        assert_eq!(out, "asa# show running-config\n: Saved\nhostname asa\n");
    }

    #[test]
    fn test_no_echo_is_unchanged() {
        let raw = "  set system host-name qfx1\n";
        assert_eq!(
            sanitize(raw, &["show configuration | display set | no-more"]),
            raw
        );
        assert_eq!(sanitize(raw, &[] as &[&str]), raw);
    }

    #[test]
    fn test_commands_are_literal() {
        let raw = "> show configuration | display set | no-more\nset version 20.4\n";
        let out = sanitize(raw, &["show configuration | display set | no-more"]);
        assert_eq!(out, "set version 20.4\n");
    }

    #[test]
    fn test_echo_only_yields_empty() {
        assert_eq!(sanitize("show run\n", &["show run"]), "");
    }
}
