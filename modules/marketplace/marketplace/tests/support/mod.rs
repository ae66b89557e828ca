//! Shared fixtures: an in-memory database with migrations applied, a seeded
//! set of users and scripted AI and payment adapters.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ifrof_rpc::{CallContext, Invocation, RpcError};
use marketplace::MarketplaceConfig;
use marketplace::domain::ports::{
    AiChatError, ChatCompletion, ChatTurn, CheckoutRequest, GatewaySession, PaymentError,
    PaymentGateway,
};
use marketplace::infra::payments::SandboxGateway;
use marketplace::infra::session::caller_from_user;
use marketplace::{Marketplace, NewUser, Role, User};
use marketplace_sdk::{Factory, Language, NewFactory, VerificationStatus};
use parking_lot::Mutex;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;

/// AI adapter that echoes the last turn or fails on demand.
#[derive(Default)]
pub struct ScriptedAi {
    failure: Mutex<Option<AiChatError>>,
    calls: Mutex<Vec<(Language, Vec<ChatTurn>)>>,
}

impl ScriptedAi {
    pub fn fail_with(&self, error: AiChatError) {
        *self.failure.lock() = Some(error);
    }

    pub fn calls(&self) -> Vec<(Language, Vec<ChatTurn>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedAi {
    async fn complete(
        &self,
        language: Language,
        history: &[ChatTurn],
    ) -> Result<String, AiChatError> {
        self.calls.lock().push((language, history.to_vec()));
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        let last = history.last().map_or("", |t| t.content.as_str());
        Ok(format!("[{language}] {last}"))
    }
}

/// Sandbox checkout unless told to fail.
pub struct ScriptedGateway {
    sandbox: SandboxGateway,
    failure: Mutex<Option<PaymentError>>,
}

impl ScriptedGateway {
    fn new(success_url: &str) -> Self {
        Self {
            sandbox: SandboxGateway::new(success_url).unwrap(),
            failure: Mutex::new(None),
        }
    }

    pub fn fail_with(&self, error: PaymentError) {
        *self.failure.lock() = Some(error);
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<GatewaySession, PaymentError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        self.sandbox.create_checkout_session(request).await
    }
}

pub struct TestApp {
    pub module: Marketplace,
    pub db: DatabaseConnection,
    pub ai: Arc<ScriptedAi>,
    pub gateway: Arc<ScriptedGateway>,
    pub factory: Factory,
    pub other_factory: Factory,
    pub admin: User,
    pub buyer: User,
    pub other_buyer: User,
    pub factory_user: User,
}

pub async fn connect() -> DatabaseConnection {
    // One connection: every pooled connection would get its own empty database.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite");
    Marketplace::migrate(&db).await.expect("migrate");
    db
}

pub async fn app() -> TestApp {
    let db = connect().await;
    let cfg = MarketplaceConfig::default();
    let ai = Arc::new(ScriptedAi::default());
    let gateway = Arc::new(ScriptedGateway::new(&cfg.payments.success_url));
    let module =
        Marketplace::with_adapters(db.clone(), &cfg, gateway.clone(), ai.clone()).unwrap();

    let services = module.services();
    let factory = services
        .factories
        .create(NewFactory {
            name: "Shenzhen Precision Parts".to_owned(),
            description: Some("CNC machining and stamping".to_owned()),
            location: Some("Shenzhen, Guangdong".to_owned()),
            contact_email: Some("sales@szpp.example".to_owned()),
            contact_phone: None,
            verification_status: VerificationStatus::Verified,
        })
        .await
        .unwrap();
    let other_factory = services
        .factories
        .create(NewFactory {
            name: "Ningbo Textiles".to_owned(),
            description: None,
            location: Some("Ningbo, Zhejiang".to_owned()),
            contact_email: None,
            contact_phone: None,
            verification_status: VerificationStatus::Pending,
        })
        .await
        .unwrap();

    let admin = user(&module, "Ada Admin", Role::Admin, None).await;
    let buyer = user(&module, "Bea Buyer", Role::Buyer, None).await;
    let other_buyer = user(&module, "Bo Buyer", Role::Buyer, None).await;
    let factory_user = user(&module, "Fei Factory", Role::Factory, Some(factory.id)).await;

    TestApp {
        module,
        db,
        ai,
        gateway,
        factory,
        other_factory,
        admin,
        buyer,
        other_buyer,
        factory_user,
    }
}

async fn user(
    module: &Marketplace,
    name: &str,
    role: Role,
    factory_id: Option<uuid::Uuid>,
) -> User {
    let email = format!("{}@ifrof.example", name.to_lowercase().replace(' ', "."));
    module
        .create_user(NewUser {
            name: Some(name.to_owned()),
            email: Some(email),
            role,
            factory_id,
        })
        .await
        .unwrap()
}

impl TestApp {
    pub fn ctx(&self, who: Option<&User>) -> CallContext {
        who.map_or_else(CallContext::anonymous, |u| {
            CallContext::for_caller(caller_from_user(u))
        })
    }

    /// Invokes a procedure the way the HTTP POST binding does.
    pub async fn call(
        &self,
        who: Option<&User>,
        name: &str,
        input: Value,
    ) -> Result<Value, RpcError> {
        self.module
            .registry()
            .invoke(self.ctx(who), name, input, Invocation::Any)
            .await
    }

    pub async fn ok(&self, who: Option<&User>, name: &str, input: Value) -> Value {
        match self.call(who, name, input).await {
            Ok(v) => v,
            Err(e) => panic!("{name} failed: {} {}", e.code, e.message),
        }
    }

    pub fn token(&self, user: &User) -> String {
        self.module.session_signer().issue(user.id).unwrap()
    }
}
