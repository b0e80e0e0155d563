//! Selection model backed by a raw text-completion service
//!
//! Owns the prompt contract of the three selection operations and turns
//! the model's free-form replies into typed results.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::domain::model::WindowIndex;
use crate::ports::{SelectionModelPort, TextCompletionPort};

pub mod parse;
pub mod prompts;

pub use parse::{parse_index_list, parse_title};

/// Prompted selection model
pub struct PromptedSelectionModel {
    completion: Arc<dyn TextCompletionPort>,
}

impl PromptedSelectionModel {
    pub fn new(completion: Arc<dyn TextCompletionPort>) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl SelectionModelPort for PromptedSelectionModel {
    async fn nominate(&self, category: &str, chunk: &str) -> Result<Vec<WindowIndex>, DomainError> {
        let reply = self
            .completion
            .complete(&prompts::map_prompt(category, chunk))
            .await?;
        parse_index_list(&reply)
    }

    async fn condense(
        &self,
        category: &str,
        candidates_text: &str,
        target_count: usize,
    ) -> Result<Vec<WindowIndex>, DomainError> {
        let reply = self
            .completion
            .complete(&prompts::reduce_prompt(category, candidates_text, target_count))
            .await?;
        parse_index_list(&reply)
    }

    async fn title(&self, category: &str, segment_text: &str) -> Result<String, DomainError> {
        let reply = self
            .completion
            .complete(&prompts::title_prompt(category, segment_text))
            .await?;
        parse_title(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct EchoCompletion {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextCompletionPort for EchoCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn model(reply: &str) -> (PromptedSelectionModel, Arc<EchoCompletion>) {
        let completion = Arc::new(EchoCompletion {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        (PromptedSelectionModel::new(completion.clone()), completion)
    }

    #[tokio::test]
    async fn test_nominate_sends_chunk_and_parses() {
        let (model, completion) = model("-1, 3");
        let indices = model.nominate("Sports", "[3] the goal").await.unwrap();
        assert_eq!(indices, vec![WindowIndex(3)]);
        assert!(completion.prompts.lock().unwrap()[0].contains("[3] the goal"));
    }

    #[tokio::test]
    async fn test_condense_surfaces_parse_error() {
        let (model, _) = model("the best ones are 1 and 2");
        let result = model.condense("Sports", "[1] a\n\n[2] b", 1).await;
        assert!(matches!(result, Err(DomainError::SelectionParse(_))));
    }

    #[tokio::test]
    async fn test_title_is_cleaned() {
        let (model, _) = model("\"Last Minute Winner\"\n");
        assert_eq!(
            model.title("Sports", "he scores").await.unwrap(),
            "Last Minute Winner"
        );
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        struct Down;
        #[async_trait]
        impl TextCompletionPort for Down {
            async fn complete(&self, _prompt: &str) -> Result<String, DomainError> {
                Err(DomainError::ModelUnavailable("connection refused".to_string()))
            }
        }
        let model = PromptedSelectionModel::new(Arc::new(Down));
        let result = model.nominate("News", "[0] x").await;
        assert!(matches!(result, Err(DomainError::ModelUnavailable(_))));
    }
}
