//! Context resolution from signed session tokens.

use std::sync::Arc;

use async_trait::async_trait;
use ifrof_rpc::{IdentityResolver, RequestHandle};
use ifrof_security::{Caller, SessionSigner};
use marketplace_sdk::User;
use tracing::{debug, warn};

use crate::domain::repos::UsersRepository;

/// Caller view of a stored user.
#[must_use]
pub fn caller_from_user(user: &User) -> Caller {
    let mut builder = Caller::builder(user.id, user.role).factory_id(user.factory_id);
    if let Some(name) = &user.name {
        builder = builder.name(name.clone());
    }
    if let Some(email) = &user.email {
        builder = builder.email(email.clone());
    }
    builder.build()
}

/// Reads the session token from `Authorization: Bearer` or, failing that,
/// the session cookie, then reloads the user so role changes apply at once.
pub struct SessionIdentityResolver {
    signer: SessionSigner,
    cookie_name: String,
    users: Arc<dyn UsersRepository>,
}

impl SessionIdentityResolver {
    pub fn new(
        signer: SessionSigner,
        cookie_name: impl Into<String>,
        users: Arc<dyn UsersRepository>,
    ) -> Self {
        Self {
            signer,
            cookie_name: cookie_name.into(),
            users,
        }
    }
}

#[async_trait]
impl IdentityResolver for SessionIdentityResolver {
    async fn resolve(&self, request: &RequestHandle) -> Option<Caller> {
        let token = request
            .bearer_token()
            .or_else(|| request.cookie(&self.cookie_name))?;

        let user_id = match self.signer.verify(token) {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "Ignoring invalid session token");
                return None;
            }
        };

        match self.users.get(user_id).await {
            Ok(Some(user)) => Some(caller_from_user(&user)),
            Ok(None) => {
                debug!(%user_id, "Session refers to an unknown user");
                None
            }
            Err(e) => {
                warn!(%user_id, error = %e, "User lookup failed during context resolution");
                None
            }
        }
    }
}
