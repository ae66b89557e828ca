//! `SeaORM` storage: entities, migrations and repository implementations.

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, DbErr};
use tracing::error;

use crate::domain::error::DomainError;

pub mod entity;
pub mod mapper;
pub mod migrations;

mod chat_repo;
mod conversations_repo;
mod factories_repo;
mod forum_repo;
mod inquiries_repo;
mod notifications_repo;
mod orders_repo;
mod products_repo;
mod users_repo;

pub use chat_repo::SeaOrmChatRepository;
pub use conversations_repo::SeaOrmConversationsRepository;
pub use factories_repo::SeaOrmFactoriesRepository;
pub use forum_repo::SeaOrmForumRepository;
pub use inquiries_repo::SeaOrmInquiriesRepository;
pub use notifications_repo::SeaOrmNotificationsRepository;
pub use orders_repo::SeaOrmOrdersRepository;
pub use products_repo::SeaOrmProductsRepository;
pub use users_repo::SeaOrmUsersRepository;

/// Store failures never carry SQL details past this point.
pub(crate) fn db_err(e: DbErr) -> DomainError {
    error!(error = %e, "Database operation failed");
    DomainError::database(e.to_string())
}

/// Case-insensitive substring match on a text column. `%`, `_` and `\` in
/// the needle match literally.
pub(crate) fn contains_ci<C: ColumnTrait>(col: C, needle: &str) -> SimpleExpr {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
}
