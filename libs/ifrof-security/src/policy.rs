//! Declarative authorization attached to procedure registrations.
//!
//! A procedure declares an [`AccessPolicy`]: either `Public` or a conjunction
//! of [`Predicate`]s. Evaluation happens in two phases so that context-only
//! checks never depend on the payload:
//!
//! 1. [`AccessPolicy::check_caller`] runs `Authenticated`, `HasRole` and
//!    `NotRole` before the payload is decoded.
//! 2. [`AccessPolicy::check_input`] runs `OwnsResource` on the decoded payload.
//!
//! Within a phase the first failing predicate decides the error. An absent
//! caller always fails with [`AuthError::Unauthenticated`], whatever predicate
//! is being evaluated.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::caller::{Caller, Role};
use crate::errors::AuthError;

type OwnerExtractor<I> = Arc<dyn Fn(&I) -> Uuid + Send + Sync>;

/// A single authorization check.
pub enum Predicate<I> {
    /// The request must carry a resolved caller.
    Authenticated,
    /// The caller must have exactly this role.
    HasRole(Role),
    /// The caller must not have this role.
    NotRole(Role),
    /// The user id extracted from the payload must be the caller's id.
    OwnsResource(OwnerExtractor<I>),
}

impl<I> Predicate<I> {
    /// Ownership predicate over an id carried by the payload.
    pub fn owns<F>(extract: F) -> Self
    where
        F: Fn(&I) -> Uuid + Send + Sync + 'static,
    {
        Self::OwnsResource(Arc::new(extract))
    }

    fn is_input_dependent(&self) -> bool {
        matches!(self, Self::OwnsResource(_))
    }

    /// Stable human-readable label used by the procedure catalog.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Authenticated => "authenticated".to_owned(),
            Self::HasRole(role) => format!("role:{role}"),
            Self::NotRole(role) => format!("not-role:{role}"),
            Self::OwnsResource(_) => "owns-resource".to_owned(),
        }
    }

    fn check(&self, caller: Option<&Caller>, input: Option<&I>) -> Result<(), AuthError> {
        let caller = caller.ok_or(AuthError::Unauthenticated)?;
        match self {
            Self::Authenticated => Ok(()),
            Self::HasRole(role) => {
                if caller.role() == *role {
                    Ok(())
                } else {
                    Err(AuthError::forbidden(format!("requires role '{role}'")))
                }
            }
            Self::NotRole(role) => {
                if caller.role() == *role {
                    Err(AuthError::forbidden(format!("not allowed for role '{role}'")))
                } else {
                    Ok(())
                }
            }
            Self::OwnsResource(extract) => match input {
                Some(input) if extract(input) == caller.id() => Ok(()),
                Some(_) => Err(AuthError::forbidden("resource belongs to another user")),
                None => Ok(()),
            },
        }
    }
}

impl<I> Clone for Predicate<I> {
    fn clone(&self) -> Self {
        match self {
            Self::Authenticated => Self::Authenticated,
            Self::HasRole(role) => Self::HasRole(*role),
            Self::NotRole(role) => Self::NotRole(*role),
            Self::OwnsResource(extract) => Self::OwnsResource(Arc::clone(extract)),
        }
    }
}

impl<I> fmt::Debug for Predicate<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Access policy of one procedure.
pub enum AccessPolicy<I> {
    Public,
    Require(Vec<Predicate<I>>),
}

impl<I> AccessPolicy<I> {
    /// Context-only phase. Runs before the payload is decoded.
    ///
    /// # Errors
    /// Returns the error of the first failing context predicate.
    pub fn check_caller(&self, caller: Option<&Caller>) -> Result<(), AuthError> {
        match self {
            Self::Public => Ok(()),
            Self::Require(predicates) => {
                if predicates.iter().any(Predicate::is_input_dependent) && caller.is_none() {
                    return Err(AuthError::Unauthenticated);
                }
                predicates
                    .iter()
                    .filter(|p| !p.is_input_dependent())
                    .try_for_each(|p| p.check(caller, None))
            }
        }
    }

    /// Payload phase. Runs after decoding and validation.
    ///
    /// # Errors
    /// Returns the error of the first failing input-dependent predicate.
    pub fn check_input(&self, caller: Option<&Caller>, input: &I) -> Result<(), AuthError> {
        match self {
            Self::Public => Ok(()),
            Self::Require(predicates) => predicates
                .iter()
                .filter(|p| p.is_input_dependent())
                .try_for_each(|p| p.check(caller, Some(input))),
        }
    }

    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        match self {
            Self::Public => vec!["public".to_owned()],
            Self::Require(predicates) => predicates.iter().map(Predicate::label).collect(),
        }
    }
}

impl<I> Clone for AccessPolicy<I> {
    fn clone(&self) -> Self {
        match self {
            Self::Public => Self::Public,
            Self::Require(predicates) => Self::Require(predicates.clone()),
        }
    }
}

impl<I> fmt::Debug for AccessPolicy<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.labels()).finish()
    }
}
