//! Entity to contract model mappers.
//!
//! Conversions that parse stored labels or JSON are fallible; a row that does
//! not parse is reported as a store failure.

use std::fmt::Display;
use std::str::FromStr;

use marketplace_sdk::{
    ChatMessage, Conversation, Factory, ForumAnswer, ForumPost, Inquiry, Message, Notification,
    Order, OrderItem, Product, User,
};

use super::entity::{
    chat_message, conversation, factory, forum_answer, forum_post, inquiry, message, notification,
    order, product, user,
};
use crate::domain::error::DomainError;
use crate::domain::money::from_minor_units;

pub(crate) fn parse_label<T>(column: &str, value: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| DomainError::database(format!("column {column}: {e}")))
}

pub(crate) fn to_json<T: serde::Serialize>(column: &str, value: &T) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| DomainError::database(format!("column {column}: {e}")))
}

fn from_json<T: serde::de::DeserializeOwned>(column: &str, value: &str) -> Result<T, DomainError> {
    serde_json::from_str(value).map_err(|e| DomainError::database(format!("column {column}: {e}")))
}

impl TryFrom<user::Model> for User {
    type Error = DomainError;

    fn try_from(m: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            name: m.name,
            email: m.email,
            role: parse_label("users.role", &m.role)?,
            factory_id: m.factory_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
            last_signed_in: m.last_signed_in,
        })
    }
}

impl TryFrom<factory::Model> for Factory {
    type Error = DomainError;

    fn try_from(m: factory::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            name: m.name,
            description: m.description,
            location: m.location,
            contact_email: m.contact_email,
            contact_phone: m.contact_phone,
            verification_status: parse_label(
                "factories.verification_status",
                &m.verification_status,
            )?,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl TryFrom<product::Model> for Product {
    type Error = DomainError;

    fn try_from(m: product::Model) -> Result<Self, Self::Error> {
        let min_order_quantity = u32::try_from(m.min_order_quantity).map_err(|_| {
            DomainError::database("column products.min_order_quantity: negative value")
        })?;
        Ok(Self {
            id: m.id,
            factory_id: m.factory_id,
            name: m.name,
            description: m.description,
            category: m.category,
            price: from_minor_units(m.price_minor),
            min_order_quantity,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl TryFrom<inquiry::Model> for Inquiry {
    type Error = DomainError;

    fn try_from(m: inquiry::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            buyer_id: m.buyer_id,
            factory_id: m.factory_id,
            subject: m.subject,
            description: m.description,
            status: parse_label("inquiries.status", &m.status)?,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl TryFrom<forum_post::Model> for ForumPost {
    type Error = DomainError;

    fn try_from(m: forum_post::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            author_id: m.author_id,
            title: m.title,
            content: m.content,
            category: m.category,
            tags: from_json("forum_posts.tags", &m.tags)?,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<forum_answer::Model> for ForumAnswer {
    fn from(m: forum_answer::Model) -> Self {
        Self {
            id: m.id,
            post_id: m.post_id,
            author_id: m.author_id,
            content: m.content,
            votes: m.votes,
            is_best: m.is_best,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl TryFrom<order::Model> for Order {
    type Error = DomainError;

    fn try_from(m: order::Model) -> Result<Self, Self::Error> {
        let items: Vec<OrderItem> = from_json("orders.items", &m.items)?;
        Ok(Self {
            id: m.id,
            order_number: m.order_number,
            buyer_id: m.buyer_id,
            factory_id: m.factory_id,
            items,
            total_amount: from_minor_units(m.total_minor),
            currency: m.currency,
            status: parse_label("orders.status", &m.status)?,
            checkout_session_id: m.checkout_session_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl TryFrom<notification::Model> for Notification {
    type Error = DomainError;

    fn try_from(m: notification::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            user_id: m.user_id,
            kind: parse_label("notifications.kind", &m.kind)?,
            title: m.title,
            message: m.message,
            link: m.link,
            is_read: m.is_read,
            created_at: m.created_at,
        })
    }
}

impl TryFrom<chat_message::Model> for ChatMessage {
    type Error = DomainError;

    fn try_from(m: chat_message::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            user_id: m.user_id,
            session_id: m.session_id,
            role: parse_label("chat_messages.role", &m.role)?,
            content: m.content,
            created_at: m.created_at,
        })
    }
}

impl From<conversation::Model> for Conversation {
    fn from(m: conversation::Model) -> Self {
        Self {
            id: m.id,
            buyer_id: m.buyer_id,
            factory_id: m.factory_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<message::Model> for Message {
    fn from(m: message::Model) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_id: m.sender_id,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

/// Converts a batch of rows, failing on the first row that does not parse.
pub(crate) fn try_collect<M, T>(rows: Vec<M>) -> Result<Vec<T>, DomainError>
where
    T: TryFrom<M, Error = DomainError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use marketplace_sdk::{OrderStatus, Role};
    use rust_decimal::Decimal;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn unknown_role_label_is_a_store_failure() {
        let now = OffsetDateTime::now_utc();
        let row = user::Model {
            id: Uuid::new_v4(),
            name: None,
            email: None,
            role: "superuser".to_owned(),
            factory_id: None,
            created_at: now,
            updated_at: now,
            last_signed_in: None,
        };
        assert!(matches!(User::try_from(row), Err(DomainError::Database { .. })));
    }

    #[test]
    fn order_row_restores_items_and_amounts() {
        let now = OffsetDateTime::now_utc();
        let items = vec![OrderItem {
            product_id: Uuid::new_v4(),
            quantity: 4,
            price: Decimal::new(1250, 2),
        }];
        let row = order::Model {
            id: Uuid::new_v4(),
            order_number: "ORD-ABC".to_owned(),
            buyer_id: Uuid::new_v4(),
            factory_id: Uuid::new_v4(),
            items: to_json("orders.items", &items).unwrap(),
            total_minor: 5000,
            currency: "usd".to_owned(),
            status: "processing".to_owned(),
            checkout_session_id: None,
            created_at: now,
            updated_at: now,
        };
        let order = Order::try_from(row).unwrap();
        assert_eq!(order.items, items);
        assert_eq!(order.total_amount, Decimal::new(5000, 2));
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(parse_label::<Role>("users.role", "admin").unwrap(), Role::Admin);
    }
}
