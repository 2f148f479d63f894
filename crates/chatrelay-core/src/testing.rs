//! In-memory doubles shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use chatrelay_types::chat::{ChatMessage, Conversation};
use chatrelay_types::error::RepositoryError;
use chatrelay_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent, Usage,
};
use chatrelay_types::research::{SearchError, SearchMode, WebResult};

use crate::chat::repository::ChatRepository;
use crate::llm::provider::{LlmProvider, LlmStream};
use crate::search::provider::SearchProvider;

#[derive(Default)]
pub struct InMemoryChatRepository {
    conversations: Mutex<Vec<Conversation>>,
    messages: Mutex<Vec<ChatMessage>>,
}

impl InMemoryChatRepository {
    pub fn all_messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl ChatRepository for InMemoryChatRepository {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, RepositoryError> {
        self.conversations
            .lock()
            .unwrap()
            .push(conversation.clone());
        Ok(conversation.clone())
    }

    async fn get_conversation(
        &self,
        id: &Uuid,
        user_id: &str,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == *id && c.user_id == user_id)
            .cloned())
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>, RepositoryError> {
        let mut list: Vec<_> = self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(list)
    }

    async fn update_title(
        &self,
        id: &Uuid,
        user_id: &str,
        title: &str,
    ) -> Result<(), RepositoryError> {
        let mut conversations = self.conversations.lock().unwrap();
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == *id && c.user_id == user_id)
            .ok_or(RepositoryError::NotFound)?;
        conversation.title = title.to_string();
        conversation.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_conversation(&self, id: &Uuid, user_id: &str) -> Result<(), RepositoryError> {
        let mut conversations = self.conversations.lock().unwrap();
        let before = conversations.len();
        conversations.retain(|c| !(c.id == *id && c.user_id == user_id));
        if conversations.len() == before {
            return Err(RepositoryError::NotFound);
        }
        self.messages
            .lock()
            .unwrap()
            .retain(|m| m.conversation_id != *id);
        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn get_messages(&self, conversation_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == *conversation_id)
            .cloned()
            .collect())
    }

    async fn get_recent_messages(
        &self,
        conversation_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let all = self.get_messages(conversation_id).await?;
        let skip = all.len().saturating_sub(limit);
        Ok(all.into_iter().skip(skip).collect())
    }
}

/// One scripted stream item.
#[derive(Clone)]
pub enum Step {
    Text(&'static str),
    Fail(&'static str),
}

/// Provider that answers `complete` from a queue of canned replies and
/// `stream` from a fixed script. Records every request it receives.
pub struct ScriptedProvider {
    name: String,
    completions: Mutex<VecDeque<Result<String, String>>>,
    script: Vec<Step>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            completions: Mutex::new(VecDeque::new()),
            script: Vec::new(),
            requests: Arc::default(),
        }
    }

    pub fn with_completion(self, reply: &str) -> Self {
        self.completions
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
        self
    }

    pub fn with_failed_completion(self, message: &str) -> Self {
        self.completions
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn with_script(mut self, script: Vec<Step>) -> Self {
        self.script = script;
        self
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.completions.lock().unwrap().pop_front();
        async move {
            match next {
                Some(Ok(content)) => Ok(CompletionResponse {
                    id: "scripted".to_string(),
                    content,
                    model: "scripted-model".to_string(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                }),
                Some(Err(message)) => Err(LlmError::Provider { message }),
                None => Err(LlmError::Provider {
                    message: "no scripted completion".to_string(),
                }),
            }
        }
    }

    fn stream(&self, request: CompletionRequest) -> LlmStream {
        self.requests.lock().unwrap().push(request);
        let script = self.script.clone();
        Box::pin(async_stream::stream! {
            for step in script {
                match step {
                    Step::Text(text) => yield Ok(StreamEvent::TextDelta { text: text.to_string() }),
                    Step::Fail(message) => {
                        yield Err(LlmError::Stream(message.to_string()));
                        return;
                    }
                }
            }
            yield Ok(StreamEvent::MessageDelta { stop_reason: StopReason::EndTurn });
            yield Ok(StreamEvent::Done);
        })
    }
}

/// Search backend returning the same results for every query.
pub struct StaticSearch {
    pub results: Vec<WebResult>,
    pub fail: bool,
    pub calls: Arc<Mutex<Vec<(String, SearchMode)>>>,
}

impl StaticSearch {
    pub fn new(results: Vec<WebResult>) -> Self {
        Self {
            results,
            fail: false,
            calls: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: Vec::new(),
            fail: true,
            calls: Arc::default(),
        }
    }
}

impl SearchProvider for StaticSearch {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        _limit: u32,
    ) -> Result<Vec<WebResult>, SearchError> {
        self.calls.lock().unwrap().push((query.to_string(), mode));
        if self.fail {
            Err(SearchError::Status { status: 500 })
        } else {
            Ok(self.results.clone())
        }
    }
}

pub fn web_result(title: &str, link: &str) -> WebResult {
    WebResult {
        title: title.to_string(),
        link: link.to_string(),
        snippet: Some(format!("About {title}")),
        source: None,
        date: None,
    }
}
