use std::sync::Arc;

use ifrof_security::Caller;
use marketplace_sdk::{
    CheckoutSession, NewNotification, NewOrder, NotificationType, Order, OrderItem, OrderStatus,
};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::ports::{CheckoutRequest, PaymentGateway};
use crate::domain::repos::OrdersRepository;
use crate::domain::service::NotificationsService;

const ORDER_NUMBER_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Human-facing order reference: `ORD-` followed by 12 uppercase alphanumerics.
#[must_use]
pub fn generate_order_number() -> String {
    format!("ORD-{}", nanoid::nanoid!(12, &ORDER_NUMBER_ALPHABET))
}

fn order_total(items: &[OrderItem]) -> Result<Decimal, DomainError> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        item.line_total()
            .and_then(|line| acc.checked_add(line))
            .ok_or_else(|| DomainError::validation("items", "order total is out of range"))
    })
}

pub struct PaymentsService {
    orders: Arc<dyn OrdersRepository>,
    gateway: Arc<dyn PaymentGateway>,
    notifications: Arc<NotificationsService>,
    default_currency: String,
}

impl PaymentsService {
    pub fn new(
        orders: Arc<dyn OrdersRepository>,
        gateway: Arc<dyn PaymentGateway>,
        notifications: Arc<NotificationsService>,
        default_currency: String,
    ) -> Self {
        Self {
            orders,
            gateway,
            notifications,
            default_currency,
        }
    }

    /// Opens a hosted checkout session, then records the pending order.
    ///
    /// The gateway is called first: a failed session leaves no order behind.
    #[instrument(
        skip(self, caller, items),
        fields(buyer_id = %caller.id(), factory_id = %factory_id, items = items.len())
    )]
    pub async fn create_checkout(
        &self,
        caller: &Caller,
        factory_id: Uuid,
        items: Vec<OrderItem>,
        currency: Option<String>,
    ) -> Result<CheckoutSession, DomainError> {
        if items.is_empty() {
            return Err(DomainError::validation("items", "at least one item is required"));
        }
        let total_amount = order_total(&items)?;
        let currency = currency
            .map(|c| c.trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.default_currency.clone());
        let order_number = generate_order_number();

        let request = CheckoutRequest {
            order_number: order_number.clone(),
            buyer_id: caller.id(),
            buyer_email: caller.email().map(ToOwned::to_owned),
            factory_id,
            items,
            currency,
        };
        let session = self.gateway.create_checkout_session(&request).await?;
        debug!(session_id = %session.session_id, "Gateway opened checkout session");

        let order = self
            .orders
            .create(NewOrder {
                order_number: order_number.clone(),
                buyer_id: caller.id(),
                factory_id,
                items: request.items,
                total_amount,
                currency: request.currency,
                checkout_session_id: Some(session.session_id.clone()),
            })
            .await?;
        info!(order_id = %order.id, %order_number, %total_amount, "Created order");

        self.notifications
            .notify_best_effort(NewNotification {
                user_id: caller.id(),
                kind: NotificationType::Order,
                title: "Order created".to_owned(),
                message: format!("Order {order_number} is awaiting payment"),
                link: Some(format!("/orders/{}", order.id)),
            })
            .await;

        Ok(CheckoutSession {
            session_id: session.session_id,
            checkout_url: session.checkout_url,
            order_number,
            order_id: order.id,
        })
    }

    /// `None` for an unknown id. An existing order is only visible to its
    /// buyer, members of its factory and admins.
    #[instrument(skip(self, caller), fields(user_id = %caller.id(), order_id = %order_id))]
    pub async fn get_order(
        &self,
        caller: &Caller,
        order_id: Uuid,
    ) -> Result<Option<Order>, DomainError> {
        let Some(order) = self.orders.get(order_id).await? else {
            return Ok(None);
        };
        if !caller.acts_for_factory(order.factory_id) {
            caller.ensure_owner_or_admin(order.buyer_id)?;
        }
        Ok(Some(order))
    }

    pub async fn get_my_orders(&self, caller: &Caller) -> Result<Vec<Order>, DomainError> {
        self.orders.list_by_buyer(caller.id()).await
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.id(), factory_id = %factory_id))]
    pub async fn get_factory_orders(
        &self,
        caller: &Caller,
        factory_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        if !caller.acts_for_factory(factory_id) {
            return Err(DomainError::forbidden("not a member of this factory"));
        }
        self.orders.list_by_factory(factory_id, status).await
    }

    #[instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let current = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", order_id))?;
        if !current.status.can_transition_to(status) {
            return Err(DomainError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let updated = self
            .orders
            .update_status(order_id, status)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", order_id))?;
        info!(from = %current.status, "Order status changed");

        self.notifications
            .notify_best_effort(NewNotification {
                user_id: updated.buyer_id,
                kind: NotificationType::Order,
                title: "Order status updated".to_owned(),
                message: format!("Order {} is now {status}", updated.order_number),
                link: Some(format!("/orders/{order_id}")),
            })
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn order_numbers_are_prefixed_and_unique() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert!(a.starts_with("ORD-"));
        assert_eq!(a.len(), 16);
        assert!(a[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_ne!(a, b);
    }

    #[test]
    fn total_sums_line_items() {
        let items = vec![
            OrderItem {
                product_id: Uuid::new_v4(),
                quantity: 3,
                price: Decimal::from_str("2.50").unwrap(),
            },
            OrderItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
                price: Decimal::from_str("10").unwrap(),
            },
        ];
        assert_eq!(order_total(&items).unwrap(), Decimal::from_str("17.50").unwrap());
    }
}
