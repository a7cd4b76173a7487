//! Generic fallback for database questions with no registered action.
//!
//! Gathers loosely related read-only snapshots by keyword match and asks
//! the LLM to compose a natural-language answer in the user's language.
//! A message with no recognized keyword never touches the database.

use mpbf_core::{Language, messages};
use mpbf_llm::{CompletionClient, prompts};
use mpbf_store::FactoryStore;
use std::sync::Arc;
use tracing::warn;

/// Bilingual keyword to snapshot-topic mapping.
const KEYWORDS: &[(&str, &str)] = &[
    ("order", "orders"),
    ("طلب", "orders"),
    ("customer", "customers"),
    ("عميل", "customers"),
    ("machine", "machines"),
    ("مكينة", "machines"),
    ("ماكينة", "machines"),
    ("maintenance", "maintenance"),
    ("صيانة", "maintenance"),
    ("quality", "quality"),
    ("جودة", "quality"),
    ("roll", "rolls"),
    ("رول", "rolls"),
    ("production", "production"),
    ("انتاج", "production"),
    ("إنتاج", "production"),
];

pub struct FallbackHandler {
    client: Arc<dyn CompletionClient>,
    store: Arc<dyn FactoryStore>,
}

impl FallbackHandler {
    pub fn new(client: Arc<dyn CompletionClient>, store: Arc<dyn FactoryStore>) -> Self {
        Self { client, store }
    }

    /// Answer a database question the registry has no action for.
    pub async fn answer(&self, message: &str, language: Language) -> String {
        let topics = matched_topics(message);
        if topics.is_empty() {
            return messages::outside_domain(language);
        }

        let snapshot = match self.store.keyword_snapshot(&topics).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "keyword snapshot failed");
                return messages::outside_domain(language);
            }
        };

        let composed = self
            .client
            .complete(
                prompts::compose_system(language.is_arabic()),
                &prompts::compose_user(message, &snapshot.to_string()),
                false,
            )
            .await;

        match composed {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => messages::outside_domain(language),
            Err(error) => {
                warn!(%error, "fallback composition failed");
                messages::outside_domain(language)
            }
        }
    }
}

/// Topics matched in the message, deduplicated, in keyword-table order.
fn matched_topics(message: &str) -> Vec<&'static str> {
    let lowered = message.to_lowercase();
    let mut topics: Vec<&'static str> = Vec::new();
    for (keyword, topic) in KEYWORDS {
        if lowered.contains(keyword) && !topics.contains(topic) {
            topics.push(topic);
        }
    }
    topics
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpbf_llm::MockCompletionClient;
    use mpbf_store::InMemoryStore;

    #[test]
    fn topics_match_both_languages() {
        assert_eq!(matched_topics("كم عدد الطلبات المتأخرة؟"), vec!["orders"]);
        assert_eq!(
            matched_topics("machine maintenance status"),
            vec!["machines", "maintenance"]
        );
        assert!(matched_topics("What's the weather today?").is_empty());
    }

    #[tokio::test]
    async fn no_keywords_means_no_database_access() {
        let store = Arc::new(InMemoryStore::new());
        let client = Arc::new(MockCompletionClient::failing());
        let handler = FallbackHandler::new(client.clone(), store);

        let reply = handler
            .answer("What's the weather today?", Language::English)
            .await;

        assert_eq!(reply, messages::outside_domain(Language::English));
        // No LLM round trip either.
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn composes_from_snapshot() {
        let store = Arc::new(InMemoryStore::new());
        let client = Arc::new(
            MockCompletionClient::new().fallback("لديك 3 طلبات نشطة حالياً."),
        );
        let handler = FallbackHandler::new(client, store);

        let reply = handler.answer("كم عدد الطلبات؟", Language::Arabic).await;
        assert_eq!(reply, "لديك 3 طلبات نشطة حالياً.");
    }

    #[tokio::test]
    async fn llm_failure_degrades_to_generic_reply() {
        let store = Arc::new(InMemoryStore::new());
        let client = Arc::new(MockCompletionClient::failing());
        let handler = FallbackHandler::new(client, store);

        let reply = handler.answer("how many orders are open", Language::English).await;
        assert_eq!(reply, messages::outside_domain(Language::English));
    }
}
