//! Outpass server — application entry point.
//!
//! Startup order: tracing, environment config, SurrealDB connection,
//! migrations, onboarding policy seed, first-admin provisioning, then
//! wait for the shutdown signal.

use outpass_core::error::OutpassError;
use outpass_core::identity::IdentityProvider;
use outpass_core::models::audit::{ActivityKind, CreateAuditEntry};
use outpass_core::models::profile::{CreateProfile, Role, RoleDetails};
use outpass_core::models::system::SystemConfig;
use outpass_core::repository::{AuditLogRepository, ProfileRepository, SystemRepository};
use outpass_db::{
    DbConfig, DbError, DbManager, SurrealAuditLogRepository, SurrealIdentityProvider,
    SurrealProfileRepository, SurrealSystemRepository,
};
use outpass_flow::OnboardingConfig;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Outpass(#[from] OutpassError),
    #[error("shutdown signal error: {0}")]
    Signal(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,surrealdb=warn")),
        )
        .json()
        .init();

    if let Err(err) = run().await {
        error!(error = %err, "Fatal startup error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    info!("Starting outpass server...");

    let db_config = db_config_from_env();
    let manager = DbManager::connect(&db_config)
        .await
        .map_err(DbError::from)?;
    let db = manager.client().clone();

    outpass_db::run_migrations(&db).await?;

    let system = SurrealSystemRepository::new(db.clone());
    let policy = load_or_seed_policy(&system).await?;
    info!(
        otp_ttl_secs = policy.otp_ttl_secs,
        otp_max_attempts = policy.otp_max_attempts,
        min_password_length = policy.min_password_length,
        "Onboarding policy loaded"
    );

    let provider = match std::env::var("OUTPASS_AUTH_PEPPER") {
        Ok(pepper) if !pepper.is_empty() => {
            SurrealIdentityProvider::with_pepper(db.clone(), pepper)
        }
        _ => SurrealIdentityProvider::new(db.clone()),
    };
    let profiles = SurrealProfileRepository::new(db.clone());
    let audit = SurrealAuditLogRepository::new(db.clone());
    provision_admin(&provider, &profiles, &audit).await?;

    // TODO: Serve the role dashboards once the web adapter lands.

    info!("Outpass server ready; waiting for shutdown signal");
    tokio::signal::ctrl_c().await?;

    info!("Outpass server stopped.");
    Ok(())
}

fn db_config_from_env() -> DbConfig {
    let defaults = DbConfig::default();
    DbConfig {
        url: env_or("OUTPASS_DB_URL", &defaults.url),
        namespace: env_or("OUTPASS_DB_NS", &defaults.namespace),
        database: env_or("OUTPASS_DB_NAME", &defaults.database),
        username: env_or("OUTPASS_DB_USER", &defaults.username),
        password: env_or("OUTPASS_DB_PASS", &defaults.password),
    }
}

/// Read the persisted onboarding policy, seeding it from the environment
/// on first start so later runs ignore the env knobs.
async fn load_or_seed_policy(
    system: &impl SystemRepository,
) -> Result<OnboardingConfig, ServerError> {
    if let Some(stored) = system.load_config().await? {
        return Ok(OnboardingConfig::from(stored));
    }

    let defaults = SystemConfig::default();
    let seeded = SystemConfig {
        otp_ttl_secs: env_parsed("OUTPASS_OTP_TTL_SECS", defaults.otp_ttl_secs),
        otp_max_attempts: env_parsed("OUTPASS_OTP_MAX_ATTEMPTS", defaults.otp_max_attempts),
        min_password_length: defaults.min_password_length,
    };
    system.store_config(&seeded).await?;
    info!("Seeded onboarding policy");

    Ok(OnboardingConfig::from(seeded))
}

/// Create the first admin account from the environment so someone can
/// approve the first warden. Runs only while no admin profile exists.
async fn provision_admin(
    provider: &impl IdentityProvider,
    profiles: &impl ProfileRepository,
    audit: &impl AuditLogRepository,
) -> Result<(), ServerError> {
    if profiles.count(Some(Role::Admin), None).await? > 0 {
        return Ok(());
    }

    let email = std::env::var("OUTPASS_ADMIN_EMAIL").unwrap_or_default();
    let password = std::env::var("OUTPASS_ADMIN_PASSWORD").unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        warn!(
            "No admin profile exists; set OUTPASS_ADMIN_EMAIL and \
             OUTPASS_ADMIN_PASSWORD to provision one"
        );
        return Ok(());
    }

    let id = provider
        .create_identity(&email, &password)
        .await
        .map_err(OutpassError::from)?;

    let username = email.split('@').next().unwrap_or("admin").to_string();
    let profile = profiles
        .create(CreateProfile {
            id,
            full_name: "Administrator".into(),
            email,
            phone: String::new(),
            username,
            details: RoleDetails::Admin {
                access_code: "bootstrap".into(),
            },
        })
        .await?;

    if let Err(err) = audit
        .append(CreateAuditEntry {
            user_id: id,
            kind: ActivityKind::System,
            activity: "admin account provisioned".into(),
        })
        .await
    {
        warn!(error = %err, "Failed to record audit entry");
    }

    // Provisioning must not leave the server holding a session.
    provider.sign_out().await;

    info!(username = %profile.username, "Provisioned first admin account");
    Ok(())
}

fn env_or(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn env_parsed<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match std::env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!(var = name, value = %value, "Unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}
