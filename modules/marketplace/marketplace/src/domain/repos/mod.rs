//! Repository traits: the data access facade.
//!
//! Each method performs one logical store operation. Lookups by id return
//! `Ok(None)` for absence; targeted updates report whether a row matched.
//! Store failures surface as [`DomainError::Database`](crate::domain::error::DomainError).

mod chat_repo;
mod conversations_repo;
mod factories_repo;
mod forum_repo;
mod inquiries_repo;
mod notifications_repo;
mod orders_repo;
mod products_repo;
mod users_repo;

pub use chat_repo::ChatRepository;
pub use conversations_repo::ConversationsRepository;
pub use factories_repo::FactoriesRepository;
pub use forum_repo::ForumRepository;
pub use inquiries_repo::InquiriesRepository;
pub use notifications_repo::NotificationsRepository;
pub use orders_repo::OrdersRepository;
pub use products_repo::{ProductFilter, ProductsRepository};
pub use users_repo::UsersRepository;
