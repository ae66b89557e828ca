//! Domain service layer - business logic and rules.
//!
//! ## Architecture
//!
//! One service per procedure router:
//! - `users` - account lookup and administrative role changes
//! - `factories`, `products` - the public catalog, admin-managed
//! - `forum` - posts, answers, votes and best-answer marking
//! - `inquiries` - buyer to factory inquiries
//! - `payments` - checkout and the order state machine
//! - `notifications` - per-user inbox, also used for side-effect notices
//! - `chatbot` - AI assistant sessions
//! - `messages` - buyer/factory conversations with realtime fan-out
//!
//! ## Layering Rules
//!
//! The domain layer:
//! - **MAY** import: `marketplace_sdk` (contract types), `ifrof_security`
//! - **MUST NOT** import: `api::*` or `SeaORM`
//! - **Receives**: repositories and ports as trait objects from the composition root
//!
//! Authorization predicates that depend only on the caller or the payload are
//! declared at procedure registration. Services enforce the checks that need a
//! lookup first (order ownership, factory membership, conversation participation).

use std::sync::Arc;

use crate::domain::ports::{ChatCompletion, MessagePublisher, PaymentGateway};
use crate::domain::repos::{
    ChatRepository, ConversationsRepository, FactoriesRepository, ForumRepository,
    InquiriesRepository, NotificationsRepository, OrdersRepository, ProductsRepository,
    UsersRepository,
};

mod chatbot;
mod factories;
mod forum;
mod inquiries;
mod messages;
mod notifications;
mod payments;
mod products;
mod users;

pub use chatbot::ChatbotService;
pub use factories::FactoriesService;
pub use forum::ForumService;
pub use inquiries::InquiriesService;
pub use messages::MessagesService;
pub use notifications::NotificationsService;
pub use payments::{PaymentsService, generate_order_number};
pub use products::ProductsService;
pub use users::UsersService;

/// Configuration for the domain services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Currency used when a checkout does not name one.
    pub default_currency: String,
    /// Maximum number of notifications returned by one listing.
    pub notification_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_currency: "usd".to_owned(),
            notification_page_size: 100,
        }
    }
}

/// Storage implementations handed to the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UsersRepository>,
    pub factories: Arc<dyn FactoriesRepository>,
    pub products: Arc<dyn ProductsRepository>,
    pub forum: Arc<dyn ForumRepository>,
    pub inquiries: Arc<dyn InquiriesRepository>,
    pub orders: Arc<dyn OrdersRepository>,
    pub notifications: Arc<dyn NotificationsRepository>,
    pub chat: Arc<dyn ChatRepository>,
    pub conversations: Arc<dyn ConversationsRepository>,
}

/// External service adapters handed to the services.
#[derive(Clone)]
pub struct Adapters {
    pub payments: Arc<dyn PaymentGateway>,
    pub ai: Arc<dyn ChatCompletion>,
    pub feed: Arc<dyn MessagePublisher>,
}

// DI Container - aggregates all domain services
pub struct AppServices {
    pub users: UsersService,
    pub factories: FactoriesService,
    pub products: ProductsService,
    pub forum: ForumService,
    pub inquiries: InquiriesService,
    pub payments: PaymentsService,
    pub notifications: Arc<NotificationsService>,
    pub chatbot: ChatbotService,
    pub messages: MessagesService,
}

impl AppServices {
    #[must_use]
    pub fn new(repos: Repositories, adapters: Adapters, config: &ServiceConfig) -> Self {
        let notifications = Arc::new(NotificationsService::new(
            repos.notifications,
            config.notification_page_size,
        ));

        Self {
            users: UsersService::new(Arc::clone(&repos.users), Arc::clone(&repos.factories)),
            factories: FactoriesService::new(Arc::clone(&repos.factories)),
            products: ProductsService::new(repos.products, Arc::clone(&repos.factories)),
            forum: ForumService::new(repos.forum, Arc::clone(&notifications)),
            inquiries: InquiriesService::new(
                repos.inquiries,
                Arc::clone(&repos.users),
                Arc::clone(&notifications),
            ),
            payments: PaymentsService::new(
                repos.orders,
                adapters.payments,
                Arc::clone(&notifications),
                config.default_currency.clone(),
            ),
            chatbot: ChatbotService::new(repos.chat, adapters.ai),
            messages: MessagesService::new(repos.conversations, repos.factories, adapters.feed),
            notifications,
        }
    }
}
