//! Composition root: wires storage, adapters and services, registers the
//! procedures and exposes the HTTP router.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware::from_fn_with_state;
use ifrof_rpc::{IdentityResolver, ProcedureRegistry, RegistryError, resolve_context, rpc_routes};
use ifrof_security::{SessionError, SessionSigner};
use marketplace_sdk::{NewUser, User};
use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::api;
use crate::config::MarketplaceConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::{AiChatError, ChatCompletion, PaymentError, PaymentGateway};
use crate::domain::service::{Adapters, AppServices, Repositories, ServiceConfig};
use crate::infra::ai::OpenAiChatClient;
use crate::infra::payments::gateway_from_config;
use crate::infra::realtime::MessageFeed;
use crate::infra::session::SessionIdentityResolver;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{
    SeaOrmChatRepository, SeaOrmConversationsRepository, SeaOrmFactoriesRepository,
    SeaOrmForumRepository, SeaOrmInquiriesRepository, SeaOrmNotificationsRepository,
    SeaOrmOrdersRepository, SeaOrmProductsRepository, SeaOrmUsersRepository,
};

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("database: {0}")]
    Database(#[from] DbErr),
    #[error("payment gateway setup: {0}")]
    Payments(#[from] PaymentError),
    #[error("AI client setup: {0}")]
    Ai(#[from] AiChatError),
    #[error("procedure registration: {0}")]
    Registry(#[from] RegistryError),
    #[error("session token: {0}")]
    Session(#[from] SessionError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub struct Marketplace {
    services: Arc<AppServices>,
    registry: Arc<ProcedureRegistry>,
    resolver: Arc<dyn IdentityResolver>,
    signer: SessionSigner,
    feed: Arc<MessageFeed>,
}

impl Marketplace {
    /// Builds the module with the adapters selected by `cfg`.
    ///
    /// # Errors
    /// Fails when an adapter is misconfigured or a procedure cannot be registered.
    pub fn new(db: DatabaseConnection, cfg: &MarketplaceConfig) -> Result<Self, ModuleError> {
        let payments = gateway_from_config(&cfg.payments)?;
        let ai: Arc<dyn ChatCompletion> = Arc::new(OpenAiChatClient::new(&cfg.ai)?);
        Self::with_adapters(db, cfg, payments, ai)
    }

    /// Builds the module around caller-supplied payment and AI adapters.
    ///
    /// # Errors
    /// Fails when a procedure cannot be registered.
    pub fn with_adapters(
        db: DatabaseConnection,
        cfg: &MarketplaceConfig,
        payments: Arc<dyn PaymentGateway>,
        ai: Arc<dyn ChatCompletion>,
    ) -> Result<Self, ModuleError> {
        info!("Initializing marketplace module");

        let users = Arc::new(SeaOrmUsersRepository::new(db.clone()));
        let repos = Repositories {
            users: users.clone(),
            factories: Arc::new(SeaOrmFactoriesRepository::new(db.clone())),
            products: Arc::new(SeaOrmProductsRepository::new(db.clone())),
            forum: Arc::new(SeaOrmForumRepository::new(db.clone())),
            inquiries: Arc::new(SeaOrmInquiriesRepository::new(db.clone())),
            orders: Arc::new(SeaOrmOrdersRepository::new(db.clone())),
            notifications: Arc::new(SeaOrmNotificationsRepository::new(db.clone())),
            chat: Arc::new(SeaOrmChatRepository::new(db.clone())),
            conversations: Arc::new(SeaOrmConversationsRepository::new(db)),
        };

        let feed = Arc::new(MessageFeed::new(cfg.realtime.channel_capacity));
        let adapters = Adapters {
            payments,
            ai,
            feed: feed.clone(),
        };
        let service_config = ServiceConfig {
            default_currency: cfg.payments.default_currency.to_ascii_lowercase(),
            ..ServiceConfig::default()
        };
        let services = Arc::new(AppServices::new(repos, adapters, &service_config));

        let mut registry = ProcedureRegistry::new();
        api::rpc::register_all(&mut registry, &services, &cfg.auth.cookie_name)?;
        info!(procedures = registry.len(), "Registered procedures");

        let signer = SessionSigner::new(
            cfg.auth.session_secret.clone(),
            Duration::from_secs(cfg.auth.token_ttl_secs),
        );
        let resolver: Arc<dyn IdentityResolver> = Arc::new(SessionIdentityResolver::new(
            signer.clone(),
            cfg.auth.cookie_name.clone(),
            users,
        ));

        Ok(Self {
            services,
            registry: Arc::new(registry),
            resolver,
            signer,
            feed,
        })
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    /// Returns the store error of the first failing migration.
    pub async fn migrate(db: &DatabaseConnection) -> Result<(), ModuleError> {
        info!("Running marketplace database migrations");
        Migrator::up(db, None).await?;
        info!("Marketplace database migrations completed successfully");
        Ok(())
    }

    /// Procedure surface, SSE feed and `/api/chat`, with per-request caller
    /// resolution.
    pub fn router(&self) -> Router {
        rpc_routes(Arc::clone(&self.registry))
            .merge(api::rest::routes(
                Arc::clone(&self.services),
                Arc::clone(&self.feed),
            ))
            .layer(from_fn_with_state(Arc::clone(&self.resolver), resolve_context))
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ProcedureRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn services(&self) -> &Arc<AppServices> {
        &self.services
    }

    #[must_use]
    pub fn identity_resolver(&self) -> &Arc<dyn IdentityResolver> {
        &self.resolver
    }

    #[must_use]
    pub fn session_signer(&self) -> &SessionSigner {
        &self.signer
    }

    #[must_use]
    pub fn feed(&self) -> &Arc<MessageFeed> {
        &self.feed
    }

    /// Inserts a user directly, bypassing the procedure surface.
    ///
    /// # Errors
    /// Fails on store errors or an inconsistent factory membership.
    pub async fn create_user(&self, user: NewUser) -> Result<User, ModuleError> {
        Ok(self.services.users.create(user).await?)
    }

    /// Session token for an existing user.
    ///
    /// # Errors
    /// Fails when the user does not exist or the token cannot be signed.
    pub async fn issue_token(&self, user_id: Uuid) -> Result<String, ModuleError> {
        if self.services.users.get(user_id).await?.is_none() {
            return Err(DomainError::not_found("User", user_id).into());
        }
        let token = self.signer.issue(user_id)?;
        self.services.users.record_sign_in(user_id).await?;
        Ok(token)
    }
}
