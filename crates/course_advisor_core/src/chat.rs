//! crates/course_advisor_core/src/chat.rs
//!
//! Sequences the turns of one chat session: local screening of vague prompts,
//! recommendation requests, and feedback on earlier results.

use crate::advisor::{AdvisorError, CourseAdvisor};
use crate::classifier::is_generic_prompt;
use crate::domain::{Course, CourseRecommendation, Message};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

pub const WELCOME: &str =
    "Hello! I can help you find courses based on your interests. What would you like to learn?";
pub const DECLINE: &str = "I'm specifically designed to recommend courses based on your learning interests. Could you please tell me what subject or skills you're interested in learning? For example: 'I want to learn web development' or 'I'm looking for courses on artificial intelligence'.";
pub const FOUND_COURSES: &str = "Here are some courses that might interest you:";
pub const NO_MATCH: &str = "I couldn't find specific courses matching your request. Could you provide more details about what you'd like to learn? For example, specify a subject area, level, or particular skills you want to develop.";
pub const NO_COURSES: &str =
    "I couldn't find any courses matching your criteria. Could you try with different interests or be more specific?";
pub const POSITIVE_FEEDBACK: &str =
    "Thank you for your positive feedback! Is there anything else you'd like to know?";
pub const NEGATIVE_FEEDBACK: &str = "I'm sorry these recommendations weren't helpful. Could you provide more details about what you're looking for?";

/// What happened to the latest user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Declined,
    Recommended,
    NoCourses,
    Failed,
}

/// A user turn waiting for recommendations.
#[derive(Debug)]
pub struct PendingTurn {
    request_id: Uuid,
    query: String,
}

impl PendingTurn {
    /// Id of the user message this turn answers.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub messages: Vec<Message>,
    pub recommendations: Vec<CourseRecommendation>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: vec![Message::assistant(WELCOME)],
            recommendations: Vec::new(),
        }
    }

    /// The recommendation produced for a given user message, if any.
    pub fn recommendation_for(&self, message_id: Uuid) -> Option<&CourseRecommendation> {
        self.recommendations
            .iter()
            .find(|rec| rec.request_id == message_id)
    }

    /// Handles one user turn and appends the assistant's reply.
    pub async fn submit(&mut self, content: &str, advisor: &CourseAdvisor) -> TurnOutcome {
        match self.begin(content) {
            Some(turn) => {
                let result = advisor.recommend(turn.query()).await;
                self.complete(turn, result)
            }
            None => TurnOutcome::Declined,
        }
    }

    /// Records the user message. Vague prompts are answered on the spot and
    /// yield `None`; otherwise the returned turn still needs recommendations.
    pub fn begin(&mut self, content: &str) -> Option<PendingTurn> {
        let user_message = Message::user(content);
        let request_id = user_message.id;
        self.messages.push(user_message);

        if is_generic_prompt(content) {
            self.messages.push(Message::assistant(DECLINE));
            return None;
        }

        Some(PendingTurn {
            request_id,
            query: content.to_string(),
        })
    }

    /// Appends the assistant's reply for a turn started with [`ChatSession::begin`].
    pub fn complete(
        &mut self,
        turn: PendingTurn,
        result: Result<Vec<Course>, AdvisorError>,
    ) -> TurnOutcome {
        match result {
            Ok(courses) if !courses.is_empty() => {
                info!(session = %self.id, count = courses.len(), "Recommended courses");
                self.messages.push(Message::assistant(FOUND_COURSES));
                self.recommendations.push(CourseRecommendation {
                    id: Uuid::new_v4(),
                    request_id: turn.request_id,
                    query: turn.query,
                    courses,
                    timestamp: Utc::now(),
                });
                TurnOutcome::Recommended
            }
            Ok(_) => {
                self.messages.push(Message::assistant(NO_COURSES));
                TurnOutcome::NoCourses
            }
            Err(e) => {
                warn!(session = %self.id, "Recommendation failed: {}", e);
                self.messages.push(Message::assistant(NO_MATCH));
                TurnOutcome::Failed
            }
        }
    }

    /// Records feedback on a recommendation. Negative feedback discards it.
    /// Returns `false` when the recommendation is unknown.
    pub fn feedback(&mut self, recommendation_id: Uuid, positive: bool) -> bool {
        if !self
            .recommendations
            .iter()
            .any(|rec| rec.id == recommendation_id)
        {
            return false;
        }

        if positive {
            self.messages.push(Message::assistant(POSITIVE_FEEDBACK));
        } else {
            self.messages.push(Message::assistant(NEGATIVE_FEEDBACK));
            self.recommendations.retain(|rec| rec.id != recommendation_id);
        }
        true
    }
}
