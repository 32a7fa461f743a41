//! Timetable questions and the student's published schedules.
//!
//! The backend resolves the student's group from the credential, so neither
//! call takes an identifier.

use crate::error::{validated_question, AssistantError, Result, ASSISTANT_FALLBACK_MESSAGE};
use crate::types::{payload, Schedule, TimetableAnswer};
use core_api::{endpoints, ApiClient, ApiResponse};
use core_runtime::events::{AssistantEvent, AssistantKind, CoreEvent, EventBus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

#[derive(Serialize)]
struct QuestionRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Clone)]
pub struct TimetableService {
    client: ApiClient,
    event_bus: EventBus,
}

impl TimetableService {
    pub fn new(client: ApiClient, event_bus: EventBus) -> Self {
        Self { client, event_bus }
    }

    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn ask(&self, question: &str) -> Result<TimetableAnswer> {
        let question = validated_question(question)?;

        self.emit(AssistantEvent::RequestStarted {
            kind: AssistantKind::Timetable,
        });
        let result = self
            .client
            .post(endpoints::TIMETABLE_ASK, &QuestionRequest { question })
            .await;

        self.finish(result, |answer: &TimetableAnswer| {
            if answer.answer.trim().is_empty() {
                Err("timetable answer is empty")
            } else {
                Ok(())
            }
        })
    }

    /// Schedules published for the signed-in student's group, newest first
    /// as ordered by the backend.
    #[instrument(skip(self))]
    pub async fn my_schedules(&self) -> Result<Vec<Schedule>> {
        self.emit(AssistantEvent::RequestStarted {
            kind: AssistantKind::Timetable,
        });
        let result = self.client.get(endpoints::TIMETABLE_ME).await;

        let schedules: Vec<Schedule> = self.finish(result, |_| Ok(()))?;
        debug!(count = schedules.len(), "Schedules loaded");
        Ok(schedules)
    }

    /// Decode and check a response, then publish the matching outcome event.
    fn finish<T, F>(&self, result: core_api::Result<ApiResponse>, check: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&T) -> std::result::Result<(), &'static str>,
    {
        let decoded = match result {
            Ok(response) => T::deserialize(payload(&response.body))
                .map_err(|e| e.to_string())
                .and_then(|value| check(&value).map(|()| value).map_err(str::to_string))
                .map_err(|reason| {
                    warn!(reason = %reason, "Unexpected timetable response");
                    AssistantError::MalformedResponse(ASSISTANT_FALLBACK_MESSAGE.to_string())
                }),
            Err(e) => Err(AssistantError::from_api(&e)),
        };

        match decoded {
            Ok(value) => {
                self.emit(AssistantEvent::ResponseReceived {
                    kind: AssistantKind::Timetable,
                });
                Ok(value)
            }
            Err(error) => {
                warn!(error = %error, "Timetable request failed");
                self.emit(AssistantEvent::RequestFailed {
                    kind: AssistantKind::Timetable,
                    message: error.user_message().to_string(),
                });
                Err(error)
            }
        }
    }

    fn emit(&self, event: AssistantEvent) {
        self.event_bus.emit(CoreEvent::Assistant(event)).ok();
    }
}
