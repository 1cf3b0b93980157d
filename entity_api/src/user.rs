use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;

use entity::users::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, sea_query::Expr, ConnectionTrait, Set};

/// Inserts a new user, hashing the plain-text password carried in `user_model.password`.
/// A duplicate e-mail surfaces as `EntityApiErrorKind::RecordConflict`.
pub async fn create(db: &impl ConnectionTrait, user_model: Model) -> Result<Model, Error> {
    debug!("New User Model to be inserted: {}", user_model.email);

    let now = Utc::now();
    let user_active_model: ActiveModel = ActiveModel {
        id: Set(Id::new_v4()),
        name: Set(user_model.name),
        email: Set(user_model.email),
        phone: Set(user_model.phone),
        password: Set(generate_hash(user_model.password)),
        is_admin: Set(user_model.is_admin),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(user_active_model.insert(db).await?)
}

pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Sets the admin flag for the user with `email`. Returns the number of rows touched,
/// which is zero when no such user exists.
pub async fn set_admin(db: &impl ConnectionTrait, email: &str, is_admin: bool) -> Result<u64, Error> {
    let result = Entity::update_many()
        .col_expr(Column::IsAdmin, Expr::value(is_admin))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::Email.eq(email))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Looks up a user by e-mail and checks `password` against the stored hash.
/// Unknown users and wrong passwords are indistinguishable to the caller.
pub async fn authenticate(
    db: &impl ConnectionTrait,
    email: &str,
    password: &str,
) -> Result<Model, Error> {
    let user = find_by_email(db, email).await?.ok_or_else(|| {
        debug!("Authentication attempted for unknown email");
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }
    })?;

    verify_password(password, &user.password)?;
    Ok(user)
}

pub fn verify_password(password_to_verify: &str, password_hash: &str) -> Result<(), Error> {
    match password_auth::verify_password(password_to_verify, password_hash) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }),
    }
}

pub fn generate_hash(password: String) -> String {
    password_auth::generate_hash(password)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn user_with_password(password: &str) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            name: "Jo Bloggs".to_owned(),
            email: "jo@garage.local".to_owned(),
            phone: "07700 900000".to_owned(),
            password: generate_hash(password.to_owned()),
            is_admin: false,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn authenticate_accepts_the_right_password() -> Result<(), Error> {
        let user = user_with_password("hunter22");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection();

        let authenticated = authenticate(&db, &user.email, "hunter22").await?;

        assert_eq!(authenticated.id, user.id);
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_rejects_a_wrong_password() {
        let user = user_with_password("hunter22");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection();

        let result = authenticate(&db, &user.email, "letmein").await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordUnauthenticated
        );
    }

    #[tokio::test]
    async fn authenticate_rejects_an_unknown_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let result = authenticate(&db, "nobody@garage.local", "hunter22").await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordUnauthenticated
        );
    }

    #[tokio::test]
    async fn set_admin_reports_rows_touched() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        assert_eq!(set_admin(&db, "jo@garage.local", true).await?, 1);
        Ok(())
    }
}
