use super::error::Error;
use entity::appointment_status::AppointmentStatus;
use entity::appointments::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{
    entity::prelude::*,
    sea_query::Expr,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, QueryOrder,
};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    user_id: Id,
    datetime: DateTimeWithTimeZone,
    description: Option<String>,
) -> Result<Model, Error> {
    debug!("New Appointment for user {user_id} at {datetime}");

    let now = chrono::Utc::now();

    let appointment_active_model: ActiveModel = ActiveModel {
        id: Set(Id::new_v4()),
        user_id: Set(Some(user_id)),
        datetime: Set(datetime),
        description: Set(description.filter(|d| !d.is_empty())),
        status: Set(AppointmentStatus::Pending),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(appointment_active_model.insert(db).await?)
}

/// Edits the customer-owned fields of an appointment. `None` leaves a field untouched and an
/// empty description clears it. Status is never changed here.
pub async fn update(
    db: &impl ConnectionTrait,
    id: Id,
    datetime: Option<DateTimeWithTimeZone>,
    description: Option<String>,
) -> Result<Model, Error> {
    let appointment = find_by_id(db, id).await?;
    debug!("Existing Appointment model to be Updated: {:?}", appointment);

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(appointment.id),
        user_id: Unchanged(appointment.user_id),
        datetime: datetime.map_or(Unchanged(appointment.datetime), Set),
        description: match description {
            Some(description) => Set(Some(description).filter(|d| !d.is_empty())),
            None => Unchanged(appointment.description),
        },
        status: Unchanged(appointment.status),
        created_at: Unchanged(appointment.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?)
}

/// Persists a new moderation status. Fails with `RecordNotFound` when no row has `id`.
pub async fn update_status(
    db: &impl ConnectionTrait,
    id: Id,
    status: AppointmentStatus,
) -> Result<(), Error> {
    let result = Entity::update_many()
        .col_expr(Column::Status, Column::Status.save_as(Expr::val(status)))
        .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().fixed_offset()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        debug!("Appointment with id {id} not found");
        return Err(Error::not_found());
    }
    Ok(())
}

pub async fn delete_by_id(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let result = find_by_id(db, id).await?;

    result.delete(db).await?;
    Ok(())
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Resolves the user that owns an appointment. Ownerless rows count as not found.
pub async fn find_owner_id(db: &impl ConnectionTrait, id: Id) -> Result<Id, Error> {
    find_by_id(db, id)
        .await?
        .user_id
        .ok_or_else(Error::not_found)
}

pub async fn find_by_user(db: &impl ConnectionTrait, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_asc(Column::Datetime)
        .all(db)
        .await?)
}

pub async fn find_all(db: &impl ConnectionTrait) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_asc(Column::Datetime)
        .all(db)
        .await?)
}
