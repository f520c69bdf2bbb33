use crate::types::Label;
use regex::Regex;
use std::sync::LazyLock;

// ASCII word boundaries, so accented letters next to the digit do not hide it.
static LABEL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)([1-3])(?-u:\b)").expect("label pattern is valid"));

/// Extracts the predicted label from a model reply.
///
/// Only the first line of the trimmed reply is considered, and the digit must
/// stand alone, so "12" or "21" yield nothing. A reply without a label is not
/// an error; it simply has no prediction.
pub fn parse_prediction(reply: &str) -> Option<Label> {
    let first_line = reply.trim().lines().next()?;
    let digit = LABEL_DIGIT.captures(first_line)?.get(1)?;
    digit.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_digits() {
        assert_eq!(parse_prediction("1"), Some(Label::One));
        assert_eq!(parse_prediction("2"), Some(Label::Two));
        assert_eq!(parse_prediction("  3 \n"), Some(Label::Three));
    }

    #[test]
    fn digit_followed_by_reasoning() {
        assert_eq!(parse_prediction("2\nsome reasoning"), Some(Label::Two));
        assert_eq!(parse_prediction("1\r\nThe walls have photo texture, unlike 2."), Some(Label::One));
    }

    #[test]
    fn digit_inside_a_sentence() {
        assert_eq!(parse_prediction("Category 3."), Some(Label::Three));
        assert_eq!(parse_prediction("**2** - classic 3D"), Some(Label::Two));
    }

    #[test]
    fn first_standalone_digit_wins() {
        assert_eq!(parse_prediction("1 or maybe 2"), Some(Label::One));
        assert_eq!(parse_prediction("12 then 3"), Some(Label::Three));
    }

    #[test]
    fn non_ascii_letters_do_not_glue_to_the_digit() {
        assert_eq!(parse_prediction("é1 x"), Some(Label::One));
        assert_eq!(parse_prediction("Catégorie:2"), Some(Label::Two));
    }

    #[test]
    fn joined_digits_do_not_match() {
        assert_eq!(parse_prediction("12"), None);
        assert_eq!(parse_prediction("21"), None);
        assert_eq!(parse_prediction("123"), None);
    }

    #[test]
    fn out_of_range_digits_do_not_match() {
        assert_eq!(parse_prediction("4"), None);
        assert_eq!(parse_prediction("0"), None);
    }

    #[test]
    fn later_lines_are_ignored() {
        assert_eq!(parse_prediction("I am not sure.\n2"), None);
    }

    #[test]
    fn empty_reply_has_no_prediction() {
        assert_eq!(parse_prediction(""), None);
        assert_eq!(parse_prediction("   \n  "), None);
    }
}
