//! Builds the `WMR500C(..)` string the WMR500 display unit reads when it is
//! paired with a Wi-Fi network.

use unicode_general_category::{get_general_category, GeneralCategory};

/// Trims surrounding whitespace and drops every non-printable character.
pub fn sanitize(input: &str) -> String {
    input.trim().chars().filter(|c| is_printable(*c)).collect()
}

/// Sanitized `input` prefixed with its character count.
///
/// The count is zero padded to two digits; longer counts are written out in
/// full (`100` and up).
pub fn encode_field(input: &str) -> String {
    let clean = sanitize(input);
    format!("{:02}{}", clean.chars().count(), clean)
}

pub fn pairing_string(ssid: &str, password: &str) -> String {
    format!("WMR500C({},{})", encode_field(ssid), encode_field(password))
}

// Other, separator and unassigned categories are non-printable; ASCII space
// is the one exception.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::SpaceSeparator
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain_value() {
        assert_eq!(encode_field("abc"), "03abc");
    }

    #[test]
    fn test_encode_strips_tab_and_surrounding_spaces() {
        assert_eq!(encode_field(" a\tb "), "02ab");
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode_field(""), "00");
        assert_eq!(encode_field("   "), "00");
    }

    #[test]
    fn test_inner_spaces_are_kept() {
        assert_eq!(encode_field("my home wifi"), "12my home wifi");
    }

    #[test]
    fn test_control_and_separator_characters_are_removed() {
        assert_eq!(sanitize("net\u{0}work\n"), "network");
        assert_eq!(sanitize("bell\u{7}"), "bell");
        assert_eq!(sanitize("no\u{00A0}break"), "nobreak");
        assert_eq!(sanitize("line\u{2028}para\u{2029}"), "linepara");
    }

    #[test]
    fn test_format_characters_are_removed() {
        assert_eq!(sanitize("zero\u{200B}width"), "zerowidth");
        assert_eq!(sanitize("a\u{110BD}b"), "ab");
        assert_eq!(sanitize("a\u{13430}b"), "ab");
    }

    #[test]
    fn test_unassigned_and_private_use_are_removed() {
        assert_eq!(sanitize("a\u{0378}b"), "ab");
        assert_eq!(sanitize("a\u{E000}b"), "ab");
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert_eq!(encode_field("café"), "04café");
    }

    #[test]
    fn test_pairing_string() {
        assert_eq!(pairing_string("SSID", "PASSWORD"), "WMR500C(04SSID,08PASSWORD)");
    }

    #[test]
    fn test_pairing_string_sanitizes_both_fields() {
        assert_eq!(
            pairing_string(" Home\r\n", "\tpass word "),
            "WMR500C(04Home,09pass word)"
        );
    }

    #[test]
    fn test_two_digit_prefix_up_to_99() {
        let value = "x".repeat(99);
        assert_eq!(encode_field(&value), format!("99{}", value));
    }

    #[test]
    fn test_long_field_gets_full_length_prefix() {
        let value = "p".repeat(100);
        assert_eq!(encode_field(&value), format!("100{}", value));
    }
}
