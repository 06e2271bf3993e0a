//! Sqlx repositories. Each wraps the shared [`DbConnection`](crate::db::DbConnection)
//! and maps rows into domain models; services own all business rules.

pub mod event_repository;
pub mod family_repository;
pub mod message_repository;
pub mod preparation_repository;
pub mod user_repository;

pub use event_repository::EventRepository;
pub use family_repository::FamilyRepository;
pub use message_repository::MessageRepository;
pub use preparation_repository::PreparationRepository;
pub use user_repository::UserRepository;
