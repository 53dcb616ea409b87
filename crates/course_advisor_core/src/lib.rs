pub mod advisor;
pub mod chat;
pub mod classifier;
pub mod collection;
pub mod dashboard;
pub mod domain;
pub mod normalizer;
pub mod ports;
pub mod prompts;
pub mod slug;

pub use advisor::{AdvisorError, AdvisorModels, CourseAdvisor};
pub use chat::{ChatSession, PendingTurn, TurnOutcome};
pub use collection::{CourseCollection, IdentityPolicy};
pub use dashboard::{CourseFilters, DashboardStats};
pub use domain::{Course, CourseDetails, CourseKey, CourseLevel, CourseRecommendation, Message, Role};
pub use ports::{CompletionService, KeyValueStore, PortError, PortResult};
