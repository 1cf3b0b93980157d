use crate::error::Error;
use crate::jwt::{self, Jwt};
use crate::{users, Id};
use chrono::Utc;
use entity_api::user as UserApi;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;

pub use entity_api::user::{find_by_email, find_by_id};

/// Sign-up form as submitted by a prospective customer.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Creates a customer account. Name, e-mail and password are required and an e-mail can
/// only be registered once.
pub async fn register(
    db: &DatabaseConnection,
    registration: Registration,
) -> Result<users::Model, Error> {
    let name = registration.name.trim();
    let email = registration.email.trim();
    if name.is_empty() || email.is_empty() || registration.password.is_empty() {
        return Err(Error::invalid("name, email and password are required"));
    }

    if find_by_email(db, email).await?.is_some() {
        return Err(Error::conflict("email already registered"));
    }

    let now = Utc::now();
    let user = UserApi::create(
        db,
        users::Model {
            id: Id::nil(),
            name: name.to_owned(),
            email: email.to_owned(),
            phone: registration.phone.trim().to_owned(),
            password: registration.password,
            is_admin: false,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    info!("Registered new user {}", user.id);
    Ok(user)
}

/// Checks credentials and issues a bearer token for the user.
pub async fn login(
    db: &DatabaseConnection,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<(Jwt, users::Model), Error> {
    let user = UserApi::authenticate(db, email.trim(), password).await?;
    let jwt = jwt::generate_token(config, user.id, user.is_admin)?;

    debug!("Issued token for user {}", user.id);
    Ok((jwt, user))
}

/// Applies the configured admin promotions, then the demotions. Each address is handled on
/// its own and failures are only logged.
pub async fn sync_admin_accounts(db: &DatabaseConnection, config: &Config) {
    for email in non_blank(&config.admin_emails) {
        apply_admin_flag(db, email, true).await;
    }
    for email in non_blank(&config.admin_remove_emails) {
        apply_admin_flag(db, email, false).await;
    }
}

fn non_blank(emails: &[String]) -> impl Iterator<Item = &str> {
    emails
        .iter()
        .map(|email| email.trim())
        .filter(|email| !email.is_empty())
}

async fn apply_admin_flag(db: &DatabaseConnection, email: &str, is_admin: bool) {
    let action = if is_admin { "promote" } else { "demote" };
    match UserApi::set_admin(db, email, is_admin).await {
        Ok(0) => warn!("Could not {action} {email}: no such user"),
        Ok(_) => info!("Admin sync: {action}d {email}"),
        Err(e) => error!("Admin sync failed to {action} {email}: {e}"),
    }
}
