//! Process lifecycle
//!
//! [`Application::build`] connects to Postgres and Redis and wires the
//! services. [`Application::run`] serves until SIGINT or SIGTERM, then shuts
//! down in order: HTTP server, cleanup job, task processor, tracked
//! background work.

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{dev::Server, web, HttpServer};
use kk_core::errors::TokenError;
use kk_core::repositories::{ReminderRepository, SessionRepository, UserRepository};
use kk_core::services::auth::{AccountService, AccountServiceConfig, OAuthLogin, RequestAuthenticator};
use kk_core::services::mailer::LinkBuilder;
use kk_core::services::revocation::RevocationCache;
use kk_core::services::session::{SessionCleanupConfig, SessionCleanupJob};
use kk_core::services::tasks::{
    BrokerTaskDistributor, ProcessorConfig, SendResetPasswordEmailHandler, SendVerifyEmailHandler, TaskBroker,
    TaskProcessor, TASK_SEND_RESET_PASSWORD_EMAIL, TASK_SEND_VERIFY_EMAIL,
};
use kk_core::services::{BackgroundTasks, ReminderService, TokenService};
use kk_infra::{
    build_mailer, DatabasePool, GoogleOAuthProvider, InfrastructureError, PgReminderRepository,
    PgSessionRepository, PgUserRepository, RedisClient, RedisRevocationCache, RedisTaskBroker,
};
use kk_shared::AppConfig;
use tracing::{error, info, warn};

use crate::app::{create_app, AppState};

/// Failure while starting or running the server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("invalid token key: {0}")]
    TokenKey(#[from] TokenError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns every long-lived resource of the process
pub struct Application {
    address: String,
    port: u16,
    shutdown_timeout: Duration,
    server: Server,
    pool: DatabasePool,
    cleanup: Arc<SessionCleanupJob>,
    processor: Arc<TaskProcessor>,
    background: BackgroundTasks,
}

impl Application {
    /// Connect to the backing services and bind the listener
    pub async fn build(config: AppConfig) -> Result<Self, ServerError> {
        let pool = DatabasePool::new(&config.database).await?;
        pool.run_migrations().await?;
        let redis = RedisClient::new(config.cache.clone()).await?;

        let tokens = Arc::new(TokenService::new(config.token.symmetric_key.as_bytes())?);
        let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.get_pool().clone()));
        let sessions: Arc<dyn SessionRepository> = Arc::new(PgSessionRepository::new(pool.get_pool().clone()));
        let reminder_repository: Arc<dyn ReminderRepository> =
            Arc::new(PgReminderRepository::new(pool.get_pool().clone()));
        let revocation: Arc<dyn RevocationCache> = Arc::new(RedisRevocationCache::new(redis.clone()));
        let broker: Arc<dyn TaskBroker> = Arc::new(RedisTaskBroker::new(redis));
        let mailer = build_mailer(&config.mail)?;

        let account_config = AccountServiceConfig::from(&config.token);
        let accounts = Arc::new(AccountService::new(
            users.clone(),
            sessions.clone(),
            revocation.clone(),
            tokens.clone(),
            Arc::new(BrokerTaskDistributor::new(broker.clone())),
            account_config.clone(),
        ));

        let oauth = if config.oauth.is_configured() {
            let provider = GoogleOAuthProvider::new(config.oauth.clone())?;
            Some(Arc::new(OAuthLogin::new(Arc::new(provider), config.oauth.state.clone())))
        } else {
            warn!("Google sign-in is not configured");
            None
        };

        let links = LinkBuilder::new(&config.server.api_host, config.environment.is_production());
        let processor = TaskProcessor::new(broker, ProcessorConfig::from(&config.worker))
            .handle(
                TASK_SEND_VERIFY_EMAIL,
                Arc::new(SendVerifyEmailHandler::new(
                    users,
                    sessions.clone(),
                    tokens.clone(),
                    mailer.clone(),
                    links.clone(),
                    account_config.email_link_duration,
                )),
            )
            .handle(
                TASK_SEND_RESET_PASSWORD_EMAIL,
                Arc::new(SendResetPasswordEmailHandler::new(sessions.clone(), mailer, links)),
            );

        let cleanup = Arc::new(SessionCleanupJob::new(
            sessions,
            SessionCleanupConfig {
                interval: config.worker.cleanup_interval,
                enabled: true,
            },
        ));

        let state = web::Data::new(AppState {
            accounts,
            reminders: Arc::new(ReminderService::new(reminder_repository)),
            authenticator: RequestAuthenticator::new(tokens, revocation),
            oauth,
            environment: config.environment,
            cors: config.cors.clone(),
        });

        let listener = TcpListener::bind(&config.server.address)?;
        let port = listener.local_addr()?.port();

        let mut http = HttpServer::new(move || create_app(state.clone()))
            .shutdown_timeout(config.server.shutdown_timeout.as_secs())
            .disable_signals();
        if config.server.workers > 0 {
            http = http.workers(config.server.workers);
        }
        let server = http.listen(listener)?.run();

        Ok(Self {
            address: config.server.address,
            port,
            shutdown_timeout: config.server.shutdown_timeout,
            server,
            pool,
            cleanup,
            processor: Arc::new(processor),
            background: BackgroundTasks::new(),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until a shutdown signal arrives, then stop everything in order
    pub async fn run(self) -> Result<(), ServerError> {
        let server_handle = self.server.handle();
        let mut server_task = tokio::spawn(self.server);

        self.cleanup.start().await;
        let processor = self.processor.clone().start();
        info!(address = %self.address, "started server");

        tokio::select! {
            _ = shutdown_signal() => info!("shutting down server"),
            result = &mut server_task => match result {
                Ok(Ok(())) => warn!("HTTP server stopped on its own"),
                Ok(Err(e)) => error!(error = %e, "HTTP server failed"),
                Err(e) => error!(error = %e, "HTTP server task ended abnormally"),
            },
        }

        if tokio::time::timeout(self.shutdown_timeout, server_handle.stop(true))
            .await
            .is_err()
        {
            warn!(
                timeout_secs = self.shutdown_timeout.as_secs(),
                "HTTP server did not stop in time"
            );
        }

        self.cleanup.stop().await;
        self.background.spawn("task_processor_shutdown", processor.shutdown());
        if !self.background.wait(self.shutdown_timeout).await {
            warn!(remaining = self.background.active(), "background tasks still running at exit");
        }

        self.pool.close().await;
        info!("stopped server");
        Ok(())
    }
}

/// Resolves on SIGINT or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "caught signal"),
        _ = terminate => info!(signal = "SIGTERM", "caught signal"),
    }
}
