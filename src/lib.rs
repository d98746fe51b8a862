//! EduTrack Console Library
//!
//! Back-office console for a school: student registration and fees,
//! attendance sheets, exam reports grouped by grade, class timetables
//! rendered to PDF, notices and console users. Data lives in the school
//! API; sign-in goes through a hosted identity provider.

pub mod config;
pub mod error;
pub mod generation;
pub mod helpers;
pub mod logging;
pub mod models;
pub mod notices;
pub mod report;
pub mod service;
pub mod session;
pub mod timetable;
pub mod validation;

pub use config::ConsoleConfig;
pub use error::{ConsoleError, FieldErrors};
pub use service::{ConsoleService, DashboardSummary};

// Re-export key types for convenience
pub use helpers::api::ApiClient;
pub use helpers::auth::{FirebaseIdentity, IdentityProvider};
pub use report::{aggregate, GradeReport};
pub use session::{AuthSession, SessionContext, SessionUser};
pub use timetable::{Day, TimetableGrid, TimetableGridBuilder};
