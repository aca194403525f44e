//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod archery;
pub mod assessment;
pub mod cashbook;
pub mod dashboard;
pub mod dues;
pub mod member;
pub mod organization;
pub mod tariff;
pub mod user;

pub use archery::{
    ArcheryError, ArcheryRepository, CreateGameInput, EndView, GameWithMember, SessionView,
};
pub use assessment::{
    AssessmentError, AssessmentInput, AssessmentRepository, AssessmentRow, AssessmentTypeInput,
    MemberRecap,
};
pub use cashbook::{CashbookError, CashbookRepository, LedgerGate};
pub use dashboard::DashboardRepository;
pub use dues::{DuesError, DuesFilter, DuesInput, DuesRepository, DuesWithMember, PaymentQuery};
pub use member::{MemberDetail, MemberError, MemberInput, MemberRepository};
pub use organization::{OrganizationInput, OrganizationRepository};
pub use tariff::{STATUS_ACTIVE, TariffError, TariffInput, TariffRepository};
pub use user::{UserError, UserInput, UserRepository};

use orgkas_shared::AppError;
use sea_orm::{DbErr, SqlErr};

/// Maps a database error to the application error a caller should see.
///
/// Constraint violations become client errors; anything else is a server
/// failure.
pub fn db_app_error(err: &DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Record already exists".to_string())
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::Validation("Referenced record does not exist".to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}
