use serde::Serialize;

use crate::flows::schema::FieldSpec;

pub const MIN_PHONE_DIGITS: usize = 7;

/// Trimmed length check, counted in characters.
pub fn has_min_length(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

/// Accepts digits, spaces, `+`, `-`, `(` and `)` only, with at least seven digits.
pub fn is_valid_phone(value: &str) -> bool {
    let allowed_charset = !value.is_empty()
        && value.chars().all(|ch| ch.is_ascii_digit() || matches!(ch, ' ' | '+' | '-' | '(' | ')'));
    let digit_count = value.chars().filter(char::is_ascii_digit).count();
    allowed_charset && digit_count >= MIN_PHONE_DIGITS
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Empty,
    Invalid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    Accepted(String),
    Rejected(RejectionReason),
}

/// Trims the raw line and applies the field's rules.
///
/// Empty input never reaches the validator: it is rejected for required
/// fields and accepted as an empty value for optional ones.
pub fn process_answer(field: &FieldSpec, raw: &str) -> AnswerOutcome {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return if field.optional {
            AnswerOutcome::Accepted(String::new())
        } else {
            AnswerOutcome::Rejected(RejectionReason::Empty)
        };
    }

    if field.validate(trimmed) {
        AnswerOutcome::Accepted(trimmed.to_string())
    } else {
        AnswerOutcome::Rejected(RejectionReason::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::{has_min_length, is_valid_phone, process_answer, AnswerOutcome, RejectionReason};
    use crate::domain::order::FieldKey;
    use crate::flows::schema::{FieldSpec, SlotSchema, Validator};

    #[test]
    fn phone_accepts_formatted_numbers() {
        assert!(is_valid_phone("+1 555-123-4567"));
        assert!(is_valid_phone("5551234"));
        assert!(is_valid_phone("(91) 555 12 34"));
    }

    #[test]
    fn phone_rejects_letters_and_short_numbers() {
        assert!(!is_valid_phone("abc-defg"));
        assert!(!is_valid_phone("123456"));
        assert!(!is_valid_phone("555-1234 ext 9"));
        assert!(!is_valid_phone("+-() -"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn min_length_counts_characters_after_trim() {
        assert!(has_min_length("Ñu", 2));
        assert!(!has_min_length("   é   ", 2));
    }

    #[test]
    fn empty_answer_for_required_field_is_rejected_before_validation() {
        let schema = SlotSchema::new();
        let outcome = process_answer(schema.field(FieldKey::CustomerName), "   ");
        assert_eq!(outcome, AnswerOutcome::Rejected(RejectionReason::Empty));
    }

    #[test]
    fn empty_answer_for_optional_field_short_circuits_validator() {
        // Phone validator would reject the empty string; optionality wins.
        let field = FieldSpec {
            key: FieldKey::Comments,
            label: "comments",
            validator: Validator::Phone,
            optional: true,
        };
        assert_eq!(process_answer(&field, ""), AnswerOutcome::Accepted(String::new()));
    }

    #[test]
    fn accepted_values_are_trimmed() {
        let schema = SlotSchema::new();
        assert_eq!(
            process_answer(schema.field(FieldKey::DishName), "  Paella \n"),
            AnswerOutcome::Accepted("Paella".to_string())
        );
        assert_eq!(
            process_answer(schema.field(FieldKey::CustomerName), "A"),
            AnswerOutcome::Rejected(RejectionReason::Invalid)
        );
    }
}
