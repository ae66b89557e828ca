//! Marketplace SDK
//!
//! This crate provides the public contract of the `marketplace` module:
//! - Model types for users, factories, products, inquiries, the forum,
//!   orders, notifications, chatbot history and buyer/factory conversations
//! - Status enums, including the order state machine ([`OrderStatus`])
//! - Error type (`MarketplaceError`)
//!
//! Models serialize with camelCase field names; they are the JSON results of
//! the procedure surface.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod errors;
pub mod models;

pub use errors::MarketplaceError;
pub use ifrof_security::Role;
pub use models::{
    ChatMessage, ChatRole, ChatSession, CheckoutSession, Conversation, Factory, FactoryPatch,
    ForumAnswer, ForumPost, Inquiry, InquiryStatus, Language, Message, NewFactory, NewForumAnswer,
    NewForumPost, NewInquiry, NewNotification, NewOrder, NewProduct, NewUser, Notification,
    NotificationType, Order, OrderItem, OrderStatus, Product, ProductPatch, User,
    UnknownVariant, VerificationStatus, VoteType,
};
