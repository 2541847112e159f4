use std::sync::Arc;

use intake_core::config::LlmConfig;
use intake_core::domain::order::{CompletedOrder, FieldKey, OrderId};
use intake_core::flows::{DialogueTurnContext, SlotSchema};
use tracing::warn;

use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts;

pub const GREETING: &str =
    "Hello! Welcome to our restaurant. I'd be happy to help you with your order.";
pub const SAVING_MESSAGE: &str = "Saving your order...";
pub const FAREWELL: &str = "Thank you for ordering with us! Your order will be ready soon.";
pub const GOODBYE: &str = "Goodbye! Your order was not saved.";

/// Phrases bot output through the generation service.
///
/// Every operation returns displayable text. Generation failures are logged
/// and replaced by the fixed template for the same call site.
#[derive(Clone)]
pub struct ResponsePhraser {
    client: Arc<dyn LlmClient>,
    question_max_tokens: u32,
    confirmation_max_tokens: u32,
}

impl ResponsePhraser {
    pub fn new(client: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self {
            client,
            question_max_tokens: config.question_max_tokens,
            confirmation_max_tokens: config.confirmation_max_tokens,
        }
    }

    pub async fn phrase_next_question(&self, context: DialogueTurnContext<'_>) -> String {
        let request = CompletionRequest {
            system_prompt: prompts::question_system_prompt(&context),
            user_message: prompts::question_user_message(&context),
            max_tokens: self.question_max_tokens,
        };
        self.generate_or(request, "next_question", Some(context.current_field), || {
            fallback_question(&context)
        })
        .await
    }

    pub async fn phrase_retry(&self, context: DialogueTurnContext<'_>, raw_input: &str) -> String {
        let request = CompletionRequest {
            system_prompt: prompts::retry_system_prompt(&context),
            user_message: prompts::retry_user_message(raw_input),
            max_tokens: self.question_max_tokens,
        };
        self.generate_or(request, "retry", Some(context.current_field), || {
            fallback_retry(context.current_field, raw_input)
        })
        .await
    }

    pub async fn phrase_confirmation(&self, order: &CompletedOrder, order_id: OrderId) -> String {
        let request = CompletionRequest {
            system_prompt: prompts::confirmation_system_prompt().to_string(),
            user_message: prompts::confirmation_user_message(order, order_id),
            max_tokens: self.confirmation_max_tokens,
        };
        self.generate_or(request, "confirmation", None, || fallback_confirmation(order, order_id))
            .await
    }

    async fn generate_or(
        &self,
        request: CompletionRequest,
        call_site: &'static str,
        field: Option<FieldKey>,
        fallback: impl FnOnce() -> String,
    ) -> String {
        match self.client.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(
                    event_name = "agent.phraser.fallback",
                    call_site,
                    field = field.map(|key| key.as_str()).unwrap_or("none"),
                    error = "empty generation",
                    "generation service returned blank text; using fallback template"
                );
                fallback()
            }
            Err(error) => {
                warn!(
                    event_name = "agent.phraser.fallback",
                    call_site,
                    field = field.map(|key| key.as_str()).unwrap_or("none"),
                    error = %error,
                    "generation service failed; using fallback template"
                );
                fallback()
            }
        }
    }
}

pub fn fallback_question(context: &DialogueTurnContext<'_>) -> String {
    let label = SlotSchema::new().field(context.current_field).label;
    match context.current_field {
        FieldKey::CustomerName => format!("Could you tell me your {label}, please?"),
        FieldKey::Phone => match context.customer_name() {
            Some(name) if !name.is_empty() => {
                format!("Thanks, {name}. Now I need your {label} number so we can reach you.")
            }
            _ => format!("Now I need your {label} number so we can reach you."),
        },
        FieldKey::DishName => format!("Great. Which {label} would you like to order?"),
        FieldKey::Comments => format!(
            "Do you have any {label} or special requests for your order? (optional, press Enter to skip)"
        ),
    }
}

pub fn fallback_retry(field: FieldKey, raw_input: &str) -> String {
    let entry = SlotSchema::new().field(field);
    let rule = if entry.optional {
        format!("Any {} are welcome, or press Enter to skip.", entry.label)
    } else {
        format!("Sorry, that doesn't look right. Please tell me {}.", prompts::field_rule(entry))
    };

    if raw_input.trim().is_empty() {
        format!("I didn't catch that. {rule}")
    } else {
        rule
    }
}

pub fn fallback_confirmation(order: &CompletedOrder, order_id: OrderId) -> String {
    let mut lines = vec![
        "Your order has been registered successfully.".to_string(),
        "Order summary:".to_string(),
        format!("  Customer: {}", order.customer_name),
        format!("  Phone: {}", order.phone),
        format!("  Dish: {}", order.dish_name),
    ];
    if order.has_comments() {
        lines.push(format!("  Comments: {}", order.comments));
    }
    lines.push(format!("  Order ID: {order_id}"));
    lines.push(FAREWELL.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use intake_core::config::AppConfig;
    use intake_core::domain::order::{CollectedRecord, CompletedOrder, FieldKey, OrderId};
    use intake_core::flows::{DialogueEngine, DialogueTurnContext};

    use super::{fallback_question, fallback_retry, ResponsePhraser};
    use crate::llm::{CompletionRequest, LlmClient, LlmError};

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            Err(LlmError::Status { status: 401, message: "invalid key".to_string() })
        }
    }

    #[derive(Default)]
    struct RecordingLlm {
        requests: Mutex<Vec<CompletionRequest>>,
        reply: String,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
            Ok(self.reply.clone())
        }
    }

    fn phraser(client: Arc<dyn LlmClient>) -> ResponsePhraser {
        ResponsePhraser::new(client, &AppConfig::default().llm)
    }

    fn order() -> CompletedOrder {
        CompletedOrder {
            customer_name: "Ana".to_string(),
            phone: "+34 611 222 333".to_string(),
            dish_name: "Paella".to_string(),
            comments: String::new(),
        }
    }

    #[tokio::test]
    async fn failing_service_falls_back_on_every_call_site() {
        let phraser = phraser(Arc::new(FailingLlm));
        let mut record = CollectedRecord::new();
        DialogueEngine::default().submit(&mut record, "Ana").expect("awaiting name");

        for field in FieldKey::ALL {
            let context = DialogueTurnContext::new(&record, field);
            let question = phraser.phrase_next_question(context).await;
            assert_eq!(question, fallback_question(&context));
            assert!(!question.is_empty());

            let retry = phraser.phrase_retry(context, "").await;
            assert!(retry.starts_with("I didn't catch that."));
        }

        let confirmation = phraser.phrase_confirmation(&order(), OrderId(3)).await;
        assert!(confirmation.contains("Customer: Ana"));
        assert!(confirmation.contains("Order ID: 3"));
        assert!(!confirmation.contains("Comments:"));
    }

    #[tokio::test]
    async fn phone_fallback_uses_collected_name() {
        let phraser = phraser(Arc::new(FailingLlm));
        let mut record = CollectedRecord::new();
        DialogueEngine::default().submit(&mut record, "Ana").expect("awaiting name");

        let question =
            phraser.phrase_next_question(DialogueTurnContext::new(&record, FieldKey::Phone)).await;
        assert_eq!(question, "Thanks, Ana. Now I need your phone number so we can reach you.");
    }

    #[test]
    fn retry_templates_name_the_field_and_its_rule() {
        assert_eq!(
            fallback_retry(FieldKey::CustomerName, "A"),
            "Sorry, that doesn't look right. Please tell me a name of at least 2 characters."
        );
        assert_eq!(
            fallback_retry(FieldKey::DishName, " "),
            "I didn't catch that. Sorry, that doesn't look right. Please tell me a dish of at least 2 characters."
        );
        assert!(fallback_retry(FieldKey::Phone, "abc-defg")
            .contains("a phone number using only digits"));
        assert_eq!(
            fallback_retry(FieldKey::Comments, ""),
            "I didn't catch that. Any comments are welcome, or press Enter to skip."
        );
    }

    #[tokio::test]
    async fn blank_generation_is_treated_as_failure() {
        let client = Arc::new(RecordingLlm { reply: "   ".to_string(), ..RecordingLlm::default() });
        let phraser = phraser(client);
        let record = CollectedRecord::new();

        let question = phraser
            .phrase_next_question(DialogueTurnContext::new(&record, FieldKey::CustomerName))
            .await;
        assert_eq!(question, "Could you tell me your name, please?");
    }

    #[tokio::test]
    async fn successful_generation_is_returned_with_configured_budgets() {
        let client =
            Arc::new(RecordingLlm { reply: "Hi! What's your name?".to_string(), ..Default::default() });
        let phraser = phraser(client.clone());
        let record = CollectedRecord::new();

        let question = phraser
            .phrase_next_question(DialogueTurnContext::new(&record, FieldKey::CustomerName))
            .await;
        let confirmation = phraser.phrase_confirmation(&order(), OrderId(1)).await;

        assert_eq!(question, "Hi! What's your name?");
        assert_eq!(confirmation, "Hi! What's your name?");

        let requests = client.requests.lock().map(|r| r.clone()).unwrap_or_default();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].max_tokens, 150);
        assert_eq!(requests[1].max_tokens, 200);
        assert!(requests[1].user_message.contains("Order ID: 1"));
    }
}
