//! Question answering over indexed course documents.

use crate::error::{validated_question, AssistantError, Result, ASSISTANT_FALLBACK_MESSAGE};
use crate::types::{payload, RagAnswer};
use core_api::{endpoints, ApiClient};
use core_runtime::events::{AssistantEvent, AssistantKind, CoreEvent, EventBus};
use serde::Serialize;
use tracing::{debug, instrument, warn};

#[derive(Serialize)]
struct QuestionRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Clone)]
pub struct RagService {
    client: ApiClient,
    event_bus: EventBus,
}

impl RagService {
    pub fn new(client: ApiClient, event_bus: EventBus) -> Self {
        Self { client, event_bus }
    }

    /// Ask a free-form question.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank question, `MalformedResponse` when the
    /// backend answers without a non-empty `answer`, otherwise the transport
    /// or status failure with its display message.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn ask(&self, question: &str) -> Result<RagAnswer> {
        let question = validated_question(question)?;

        self.emit(AssistantEvent::RequestStarted {
            kind: AssistantKind::Rag,
        });

        let result = match self
            .client
            .post(endpoints::RAG_QUERY, &QuestionRequest { question })
            .await
        {
            Ok(response) => decode_answer(&response.body),
            Err(e) => {
                warn!(error = %e, "RAG query failed");
                Err(AssistantError::from_api(&e))
            }
        };

        match &result {
            Ok(answer) => {
                debug!(sources = answer.sources.as_ref().map_or(0, Vec::len), "RAG answer received");
                self.emit(AssistantEvent::ResponseReceived {
                    kind: AssistantKind::Rag,
                });
            }
            Err(error) => self.emit(AssistantEvent::RequestFailed {
                kind: AssistantKind::Rag,
                message: error.user_message().to_string(),
            }),
        }

        result
    }

    fn emit(&self, event: AssistantEvent) {
        self.event_bus.emit(CoreEvent::Assistant(event)).ok();
    }
}

fn decode_answer(body: &serde_json::Value) -> Result<RagAnswer> {
    let malformed = || AssistantError::MalformedResponse(ASSISTANT_FALLBACK_MESSAGE.to_string());

    let answer: RagAnswer = serde::Deserialize::deserialize(payload(body)).map_err(|e| {
        warn!(error = %e, "Invalid RAG answer");
        malformed()
    })?;

    if answer.answer.trim().is_empty() {
        warn!("RAG answer is empty");
        return Err(malformed());
    }
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QUESTION_VALIDATION_MESSAGE;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
    use mockall::mock;
    use serde_json::{json, Value};
    use std::sync::Arc;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn service(transport: MockHttpClient) -> (RagService, EventBus) {
        let bus = EventBus::new(16);
        let client = ApiClient::builder(Arc::new(transport), "http://localhost:8000").build();
        (RagService::new(client, bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_ask_returns_answer_and_sources() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .withf(|req| {
                let body: Value = serde_json::from_slice(req.body.as_deref().unwrap_or_default())
                    .unwrap_or(Value::Null);
                req.method == HttpMethod::Post
                    && req.url == "http://localhost:8000/api/v1/rag/query"
                    && body == json!({"question": "What is ACID?"})
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"answer":"Atomicity, consistency, isolation, durability.","sources":["bdd.pdf"],"contexts":[]}"#,
                ))
            });
        let (rag, bus) = service(transport);
        let mut events = bus.subscribe();

        let answer = rag.ask("  What is ACID? ").await.unwrap();

        assert_eq!(answer.answer, "Atomicity, consistency, isolation, durability.");
        assert_eq!(answer.sources, Some(vec!["bdd.pdf".to_string()]));
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Assistant(AssistantEvent::RequestStarted {
                kind: AssistantKind::Rag
            })
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Assistant(AssistantEvent::ResponseReceived {
                kind: AssistantKind::Rag
            })
        );
    }

    #[tokio::test]
    async fn test_sources_are_optional() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .returning(|_| Ok(HttpResponse::new(200, r#"{"answer":"Room B12"}"#)));
        let (rag, _bus) = service(transport);

        let answer = rag.ask("Where is the library?").await.unwrap();
        assert_eq!(answer.sources, None);
    }

    #[tokio::test]
    async fn test_missing_or_empty_answer_is_malformed() {
        for body in [r#"{"sources":[]}"#, r#"{"answer":""}"#, r#"{"answer":"  "}"#, "null"] {
            let mut transport = MockHttpClient::new();
            transport
                .expect_execute()
                .times(1)
                .returning(move |_| Ok(HttpResponse::new(200, body)));
            let (rag, _bus) = service(transport);

            let error = rag.ask("What is ACID?").await.unwrap_err();
            assert!(
                matches!(error, AssistantError::MalformedResponse(_)),
                "body {} should be rejected",
                body
            );
            assert_eq!(error.user_message(), ASSISTANT_FALLBACK_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_blank_question_sends_nothing() {
        let mut transport = MockHttpClient::new();
        transport.expect_execute().never();
        let (rag, _bus) = service(transport);

        let error = rag.ask("   ").await.unwrap_err();
        assert_eq!(error.user_message(), QUESTION_VALIDATION_MESSAGE);
    }

    #[tokio::test]
    async fn test_validation_error_detail_is_surfaced() {
        let mut transport = MockHttpClient::new();
        transport.expect_execute().returning(|_| {
            Ok(HttpResponse::new(
                422,
                r#"{"detail":[{"loc":["body","question"],"msg":"String should have at least 5 characters"}]}"#,
            ))
        });
        let (rag, bus) = service(transport);
        let mut events = bus.subscribe();

        let error = rag.ask("Hi").await.unwrap_err();

        assert_eq!(error.status(), Some(422));
        assert_eq!(error.user_message(), "String should have at least 5 characters");
        events.recv().await.unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Assistant(AssistantEvent::RequestFailed {
                kind: AssistantKind::Rag,
                message: "String should have at least 5 characters".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_network_failure() {
        let mut transport = MockHttpClient::new();
        transport
            .expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("connection refused".to_string())));
        let (rag, _bus) = service(transport);

        let error = rag.ask("What is ACID?").await.unwrap_err();
        assert!(matches!(error, AssistantError::NetworkFailure { .. }));
        assert_eq!(error.user_message(), ASSISTANT_FALLBACK_MESSAGE);
    }
}
