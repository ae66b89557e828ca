use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AuthError;

/// Marketplace role of an authenticated user.
///
/// A user carries exactly one role; only an administrative action changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Factory,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Factory => "factory",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "factory" => Ok(Role::Factory),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// `Caller` is the identity resolved for a single request.
///
/// Built per request by the context resolver and never stored process-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    id: Uuid,
    role: Role,
    name: Option<String>,
    email: Option<String>,
    factory_id: Option<Uuid>,
}

impl Caller {
    #[must_use]
    pub fn builder(id: Uuid, role: Role) -> CallerBuilder {
        CallerBuilder {
            id,
            role,
            name: None,
            email: None,
            factory_id: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Factory the user acts for (factory-role users only).
    #[must_use]
    pub fn factory_id(&self) -> Option<Uuid> {
        self.factory_id
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when the caller is a factory-role user acting for `factory_id`.
    #[must_use]
    pub fn acts_for_factory(&self, factory_id: Uuid) -> bool {
        self.role == Role::Factory && self.factory_id == Some(factory_id)
    }

    /// Ownership check for resources whose owner is only known after a lookup.
    ///
    /// # Errors
    /// Returns [`AuthError::Forbidden`] when the caller neither owns the
    /// resource nor is an administrator.
    pub fn ensure_owner_or_admin(&self, owner_id: Uuid) -> Result<(), AuthError> {
        if self.id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::forbidden("resource belongs to another user"))
        }
    }
}

pub struct CallerBuilder {
    id: Uuid,
    role: Role,
    name: Option<String>,
    email: Option<String>,
    factory_id: Option<Uuid>,
}

impl CallerBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn factory_id(mut self, factory_id: Option<Uuid>) -> Self {
        self.factory_id = factory_id;
        self
    }

    #[must_use]
    pub fn build(self) -> Caller {
        Caller {
            id: self.id,
            role: self.role,
            name: self.name,
            email: self.email,
            factory_id: self.factory_id,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Buyer, Role::Factory, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn owner_and_admin_pass_ownership_check() {
        let owner = Uuid::new_v4();
        let buyer = Caller::builder(owner, Role::Buyer).build();
        assert!(buyer.ensure_owner_or_admin(owner).is_ok());

        let admin = Caller::builder(Uuid::new_v4(), Role::Admin).build();
        assert!(admin.ensure_owner_or_admin(owner).is_ok());
    }

    #[test]
    fn stranger_fails_ownership_check() {
        let stranger = Caller::builder(Uuid::new_v4(), Role::Buyer).build();
        assert!(matches!(
            stranger.ensure_owner_or_admin(Uuid::new_v4()),
            Err(AuthError::Forbidden { .. })
        ));
    }

    #[test]
    fn factory_membership_requires_factory_role() {
        let factory = Uuid::new_v4();
        let member = Caller::builder(Uuid::new_v4(), Role::Factory)
            .factory_id(Some(factory))
            .build();
        assert!(member.acts_for_factory(factory));
        assert!(!member.acts_for_factory(Uuid::new_v4()));

        let buyer = Caller::builder(Uuid::new_v4(), Role::Buyer)
            .factory_id(Some(factory))
            .build();
        assert!(!buyer.acts_for_factory(factory));
    }
}
