use intake_core::domain::order::{CompletedOrder, FieldKey, OrderId};
use intake_core::flows::validation::MIN_PHONE_DIGITS;
use intake_core::flows::{DialogueTurnContext, FieldSpec, SlotSchema, Validator};

const PERSONA_PROMPT: &str = "You are a friendly, empathetic restaurant assistant taking orders over the phone.
Your goal is to collect the following information from the customer:
1. The customer's name (customer_name)
2. Phone number (phone) - must be valid: digits, optionally with +, spaces, dashes or parentheses
3. The dish they want to order (dish_name)
4. Additional comments (comments) - optional, but ask whether they have any special preference

Be natural, kind and conversational. Do not use list formatting; talk as you would in a real phone call.";

const CLOSING_PROMPT: &str = "Reply briefly, naturally and empathetically. Ask only for the current field and do not invent details.";

const CONFIRMATION_PROMPT: &str = "You are a restaurant assistant. Write a brief, friendly and professional message confirming that the order has been registered. Mention the order details and the order number naturally.";

fn field_instruction(field: FieldKey) -> &'static str {
    match field {
        FieldKey::CustomerName => "You are asking for the customer's name.",
        FieldKey::Phone => "You are asking for the customer's phone number.",
        FieldKey::DishName => "You are asking which dish the customer would like to order.",
        FieldKey::Comments => {
            "You are asking whether the customer has any comment or special request about the order. Make clear they can skip it by pressing Enter."
        }
    }
}

/// What an acceptable answer looks like, worded from the field's validator.
pub fn field_rule(field: &FieldSpec) -> String {
    match field.validator {
        Validator::MinLength(min) => format!("a {} of at least {min} characters", field.label),
        Validator::Phone => format!(
            "a {} number using only digits, spaces, +, -, ( or ), with at least {MIN_PHONE_DIGITS} digits",
            field.label
        ),
        Validator::Always => format!("any {}, or nothing at all", field.label),
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}

/// System prompt for a question about `context.current_field`.
pub fn question_system_prompt(context: &DialogueTurnContext<'_>) -> String {
    let mut prompt = String::from(PERSONA_PROMPT);

    let entries = context.collected.entries();
    if !entries.is_empty() {
        prompt.push_str("\n\nAlready collected:\n");
        for (key, value) in entries {
            prompt.push_str(&format!("- {key}: {}\n", display_value(value)));
        }
    }

    prompt.push('\n');
    prompt.push_str(field_instruction(context.current_field));
    prompt.push_str("\n\n");
    prompt.push_str(CLOSING_PROMPT);
    prompt
}

pub fn question_user_message(context: &DialogueTurnContext<'_>) -> String {
    let label = SlotSchema::new().field(context.current_field).label;
    if context.collected.is_empty() {
        format!(
            "The customer just started the conversation. Welcome them and ask for their {label}."
        )
    } else {
        format!("The last answer was accepted. Now ask for their {label}.")
    }
}

pub fn retry_system_prompt(context: &DialogueTurnContext<'_>) -> String {
    let mut prompt = question_system_prompt(context);
    prompt.push_str(&format!(
        "\nThe customer's last answer was not accepted for this field. Politely ask again and explain that you need {}.",
        field_rule(SlotSchema::new().field(context.current_field))
    ));
    prompt
}

pub fn retry_user_message(raw_input: &str) -> String {
    let trimmed = raw_input.trim();
    if trimmed.is_empty() {
        "(the customer sent an empty answer)".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn confirmation_system_prompt() -> &'static str {
    CONFIRMATION_PROMPT
}

pub fn confirmation_user_message(order: &CompletedOrder, order_id: OrderId) -> String {
    format!(
        "The order was registered successfully with the following details:
- Customer: {}
- Phone: {}
- Dish: {}
- Comments: {}
- Order ID: {order_id}

Write a confirmation message for the customer.",
        order.customer_name,
        order.phone,
        order.dish_name,
        if order.has_comments() { order.comments.as_str() } else { "None" },
    )
}

#[cfg(test)]
mod tests {
    use intake_core::domain::order::{CollectedRecord, CompletedOrder, FieldKey, OrderId};
    use intake_core::flows::{DialogueEngine, DialogueTurnContext};

    use intake_core::flows::SlotSchema;

    use super::{
        confirmation_user_message, field_rule, question_system_prompt, question_user_message,
        retry_system_prompt, retry_user_message,
    };

    #[test]
    fn question_prompt_lists_collected_fields_and_current_instruction() {
        let engine = DialogueEngine::default();
        let mut record = CollectedRecord::new();
        engine.submit(&mut record, "Ana").expect("awaiting name");

        let context = DialogueTurnContext::new(&record, FieldKey::Phone);
        let prompt = question_system_prompt(&context);

        assert!(prompt.contains("Already collected:\n- customer_name: Ana\n"));
        assert!(prompt.contains("asking for the customer's phone number"));
        assert_eq!(
            question_user_message(&context),
            "The last answer was accepted. Now ask for their phone."
        );
    }

    #[test]
    fn first_question_omits_collected_section() {
        let record = CollectedRecord::new();
        let context = DialogueTurnContext::new(&record, FieldKey::CustomerName);

        assert!(!question_system_prompt(&context).contains("Already collected"));
        assert!(question_user_message(&context).ends_with("ask for their name."));
    }

    #[test]
    fn retry_prompt_states_the_rule() {
        let record = CollectedRecord::new();
        let context = DialogueTurnContext::new(&record, FieldKey::CustomerName);

        assert!(retry_system_prompt(&context).contains("at least 2 characters"));
        assert_eq!(retry_user_message("  "), "(the customer sent an empty answer)");
        assert_eq!(retry_user_message(" A "), "A");
    }

    #[test]
    fn rules_are_worded_from_labels_and_validators() {
        let schema = SlotSchema::new();
        assert_eq!(field_rule(schema.field(FieldKey::DishName)), "a dish of at least 2 characters");
        assert!(field_rule(schema.field(FieldKey::Phone)).starts_with("a phone number"));
        assert!(field_rule(schema.field(FieldKey::Phone)).ends_with("at least 7 digits"));
        assert_eq!(field_rule(schema.field(FieldKey::Comments)), "any comments, or nothing at all");
    }

    #[test]
    fn confirmation_message_restates_every_field() {
        let order = CompletedOrder {
            customer_name: "Ana".to_string(),
            phone: "+34 611 222 333".to_string(),
            dish_name: "Paella".to_string(),
            comments: String::new(),
        };
        let message = confirmation_user_message(&order, OrderId(7));

        for expected in ["Ana", "+34 611 222 333", "Paella", "Comments: None", "Order ID: 7"] {
            assert!(message.contains(expected), "missing `{expected}`");
        }
    }
}
