//! Procedure payloads.
//!
//! Payloads are decoded from camelCase JSON, checked by [`Validate`] and only
//! then turned into SDK values. Text fields are trimmed on conversion.

use ifrof_rpc::{Validate, ValidationViolation, Violations};
use marketplace_sdk::{
    FactoryPatch, InquiryStatus, Language, NewFactory, NewNotification, NewProduct,
    NotificationType, OrderItem, OrderStatus, ProductPatch, Role, VerificationStatus, VoteType,
};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::money::MINOR_SCALE;
use crate::domain::repos::ProductFilter;

pub const NAME_MAX: usize = 200;
pub const TEXT_MAX: usize = 10_000;
pub const MESSAGE_MAX: usize = 4_000;
const TAGS_MAX: usize = 20;

type Checked = Result<(), Vec<ValidationViolation>>;

fn clean(value: String) -> String {
    value.trim().to_owned()
}

/// Trimmed text, with blank input treated as absent.
fn clean_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// At most [`MINOR_SCALE`] decimal places.
fn cents_ok(price: Decimal) -> bool {
    price.normalize().scale() <= MINOR_SCALE
}

const CENTS_MESSAGE: &str = "must have at most 2 decimal places";

fn email_ok(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty() || v.contains('@'))
}

/// `{ id }` lookups.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IdInput {
    pub id: Uuid,
}

impl Validate for IdInput {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchInput {
    pub query: String,
}

impl Validate for SearchInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .required_text("query", &self.query, NAME_MAX)
            .finish()
    }
}

// --- users ---

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleInput {
    pub user_id: Uuid,
    pub role: Role,
    pub factory_id: Option<Uuid>,
}

impl Validate for UpdateRoleInput {}

// --- factories ---

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFactoryInput {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub verification_status: Option<VerificationStatus>,
}

impl Validate for CreateFactoryInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .required_text("name", &self.name, NAME_MAX)
            .optional_text("description", self.description.as_deref(), TEXT_MAX)
            .optional_text("location", self.location.as_deref(), NAME_MAX)
            .optional_text("contactEmail", self.contact_email.as_deref(), NAME_MAX)
            .check(
                email_ok(self.contact_email.as_deref()),
                "contactEmail",
                "must be an email address",
            )
            .optional_text("contactPhone", self.contact_phone.as_deref(), NAME_MAX)
            .finish()
    }
}

impl From<CreateFactoryInput> for NewFactory {
    fn from(input: CreateFactoryInput) -> Self {
        Self {
            name: clean(input.name),
            description: clean_opt(input.description),
            location: clean_opt(input.location),
            contact_email: clean_opt(input.contact_email),
            contact_phone: clean_opt(input.contact_phone),
            verification_status: input
                .verification_status
                .unwrap_or(VerificationStatus::Pending),
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFactoryInput {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub verification_status: Option<VerificationStatus>,
}

impl Validate for UpdateFactoryInput {
    fn validate(&self) -> Checked {
        let mut v = Violations::new();
        if let Some(name) = &self.name {
            v = v.required_text("name", name, NAME_MAX);
        }
        v.optional_text("description", self.description.as_deref(), TEXT_MAX)
            .optional_text("location", self.location.as_deref(), NAME_MAX)
            .optional_text("contactEmail", self.contact_email.as_deref(), NAME_MAX)
            .check(
                email_ok(self.contact_email.as_deref()),
                "contactEmail",
                "must be an email address",
            )
            .optional_text("contactPhone", self.contact_phone.as_deref(), NAME_MAX)
            .finish()
    }
}

impl UpdateFactoryInput {
    #[must_use]
    pub fn into_patch(self) -> (Uuid, FactoryPatch) {
        let patch = FactoryPatch {
            name: self.name.map(clean),
            description: self.description.map(clean),
            location: self.location.map(clean),
            contact_email: self.contact_email.map(clean),
            contact_phone: self.contact_phone.map(clean),
            verification_status: self.verification_status,
        };
        (self.id, patch)
    }
}

// --- products ---

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsInput {
    pub factory_id: Option<Uuid>,
    pub category: Option<String>,
}

impl Validate for ListProductsInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .optional_text("category", self.category.as_deref(), NAME_MAX)
            .finish()
    }
}

impl From<ListProductsInput> for ProductFilter {
    fn from(input: ListProductsInput) -> Self {
        Self {
            factory_id: input.factory_id,
            category: clean_opt(input.category),
        }
    }
}

fn default_min_order_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub factory_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Decimal,
    #[serde(default = "default_min_order_quantity")]
    pub min_order_quantity: u32,
}

impl Validate for CreateProductInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .required_text("name", &self.name, NAME_MAX)
            .optional_text("description", self.description.as_deref(), TEXT_MAX)
            .optional_text("category", self.category.as_deref(), NAME_MAX)
            .check(!self.price.is_sign_negative(), "price", "must not be negative")
            .check(cents_ok(self.price), "price", CENTS_MESSAGE)
            .check(self.min_order_quantity > 0, "minOrderQuantity", "must be positive")
            .finish()
    }
}

impl From<CreateProductInput> for NewProduct {
    fn from(input: CreateProductInput) -> Self {
        Self {
            factory_id: input.factory_id,
            name: clean(input.name),
            description: clean_opt(input.description),
            category: clean_opt(input.category),
            price: input.price,
            min_order_quantity: input.min_order_quantity,
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub min_order_quantity: Option<u32>,
}

impl Validate for UpdateProductInput {
    fn validate(&self) -> Checked {
        let mut v = Violations::new();
        if let Some(name) = &self.name {
            v = v.required_text("name", name, NAME_MAX);
        }
        v.optional_text("description", self.description.as_deref(), TEXT_MAX)
            .optional_text("category", self.category.as_deref(), NAME_MAX)
            .check(
                self.price.is_none_or(|p| !p.is_sign_negative()),
                "price",
                "must not be negative",
            )
            .check(self.price.is_none_or(cents_ok), "price", CENTS_MESSAGE)
            .check(
                self.min_order_quantity != Some(0),
                "minOrderQuantity",
                "must be positive",
            )
            .finish()
    }
}

impl UpdateProductInput {
    #[must_use]
    pub fn into_patch(self) -> (Uuid, ProductPatch) {
        let patch = ProductPatch {
            name: self.name.map(clean),
            description: self.description.map(clean),
            category: self.category.map(clean),
            price: self.price,
            min_order_quantity: self.min_order_quantity,
        };
        (self.id, patch)
    }
}

// --- forum ---

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListPostsInput {
    pub category: Option<String>,
}

impl Validate for ListPostsInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .optional_text("category", self.category.as_deref(), NAME_MAX)
            .finish()
    }
}

impl ListPostsInput {
    #[must_use]
    pub fn category(self) -> Option<String> {
        clean_opt(self.category)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostIdInput {
    pub post_id: Uuid,
}

impl Validate for PostIdInput {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Validate for CreatePostInput {
    fn validate(&self) -> Checked {
        let mut v = Violations::new()
            .required_text("title", &self.title, NAME_MAX)
            .required_text("content", &self.content, TEXT_MAX)
            .optional_text("category", self.category.as_deref(), NAME_MAX)
            .check(
                self.tags.len() <= TAGS_MAX,
                "tags",
                &format!("must have at most {TAGS_MAX} entries"),
            );
        for (i, tag) in self.tags.iter().enumerate() {
            v = v.required_text(&format!("tags[{i}]"), tag, NAME_MAX);
        }
        v.finish()
    }
}

impl CreatePostInput {
    /// `(title, content, category, tags)` with text trimmed.
    #[must_use]
    pub fn into_parts(self) -> (String, String, Option<String>, Vec<String>) {
        (
            clean(self.title),
            clean(self.content),
            clean_opt(self.category),
            self.tags.into_iter().map(clean).collect(),
        )
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnswerInput {
    pub post_id: Uuid,
    pub content: String,
}

impl Validate for CreateAnswerInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .required_text("content", &self.content, TEXT_MAX)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteAnswerInput {
    pub answer_id: Uuid,
    pub vote_type: VoteType,
}

impl Validate for VoteAnswerInput {}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct VoteResult {
    pub success: bool,
    pub votes: i32,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIdInput {
    pub answer_id: Uuid,
}

impl Validate for AnswerIdInput {}

// --- inquiries ---

/// `buyerId` is never read from the payload; the caller is the buyer.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInquiryInput {
    pub factory_id: Uuid,
    pub subject: String,
    pub description: String,
}

impl Validate for CreateInquiryInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .required_text("subject", &self.subject, NAME_MAX)
            .required_text("description", &self.description, TEXT_MAX)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyerIdInput {
    pub buyer_id: Uuid,
}

impl Validate for BuyerIdInput {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactoryIdInput {
    pub factory_id: Uuid,
}

impl Validate for FactoryIdInput {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateInquiryStatusInput {
    pub id: Uuid,
    pub status: InquiryStatus,
}

impl Validate for UpdateInquiryStatusInput {}

// --- payments ---

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutInput {
    pub factory_id: Uuid,
    pub items: Vec<OrderItem>,
    pub currency: Option<String>,
}

impl Validate for CreateCheckoutInput {
    fn validate(&self) -> Checked {
        let mut v = Violations::new().check(
            !self.items.is_empty(),
            "items",
            "at least one item is required",
        );
        for (i, item) in self.items.iter().enumerate() {
            let line = Violations::new()
                .check(item.quantity > 0, "quantity", "must be positive")
                .check(!item.price.is_sign_negative(), "price", "must not be negative")
                .check(cents_ok(item.price), "price", CENTS_MESSAGE)
                .finish();
            v = v.nested(&format!("items[{i}]"), line);
        }
        v.check(
            self.currency.as_deref().is_none_or(|c| {
                c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic())
            }),
            "currency",
            "must be a three-letter ISO 4217 code",
        )
        .finish()
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderIdInput {
    pub order_id: Uuid,
}

impl Validate for OrderIdInput {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactoryOrdersInput {
    pub factory_id: Uuid,
    pub status: Option<OrderStatus>,
}

impl Validate for FactoryOrdersInput {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusInput {
    pub order_id: Uuid,
    pub status: OrderStatus,
}

impl Validate for UpdateOrderStatusInput {}

// --- notifications ---

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationInput {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub user_id: Uuid,
    pub link: Option<String>,
}

impl Validate for CreateNotificationInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .required_text("title", &self.title, NAME_MAX)
            .required_text("message", &self.message, MESSAGE_MAX)
            .optional_text("link", self.link.as_deref(), NAME_MAX)
            .finish()
    }
}

impl From<CreateNotificationInput> for NewNotification {
    fn from(input: CreateNotificationInput) -> Self {
        Self {
            user_id: input.user_id,
            kind: input.kind,
            title: clean(input.title),
            message: clean(input.message),
            link: clean_opt(input.link),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsInput {
    #[serde(default)]
    pub unread_only: bool,
}

impl Validate for ListNotificationsInput {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIdInput {
    pub notification_id: Uuid,
}

impl Validate for NotificationIdInput {}

// --- chatbot ---

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendChatInput {
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub language: Language,
}

impl Validate for SendChatInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .required_text("sessionId", &self.session_id, NAME_MAX)
            .required_text("message", &self.message, MESSAGE_MAX)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionInput {
    pub session_id: String,
}

impl Validate for ChatSessionInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .required_text("sessionId", &self.session_id, NAME_MAX)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ChatReply {
    pub response: String,
}

// --- messages ---

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationIdInput {
    pub conversation_id: Uuid,
}

impl Validate for ConversationIdInput {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    pub conversation_id: Uuid,
    pub content: String,
}

impl Validate for SendMessageInput {
    fn validate(&self) -> Checked {
        Violations::new()
            .required_text("content", &self.content, MESSAGE_MAX)
            .finish()
    }
}
