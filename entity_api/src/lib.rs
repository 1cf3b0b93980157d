use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};

pub use entity::{appointment_status, appointments, jwt, users, Id};

pub mod appointment;
pub mod error;
pub mod user;

/// Populates an empty database with an admin, a customer and a couple of bookings.
pub async fn seed_database(db: &impl ConnectionTrait) -> Result<(), error::Error> {
    let now = Utc::now();

    let _admin = users::ActiveModel {
        id: Set(Id::new_v4()),
        name: Set("Garage Admin".to_owned()),
        email: Set("admin@garage.local".to_owned()),
        phone: Set("01632 960000".to_owned()),
        password: Set(user::generate_hash("admin-password".to_owned())),
        is_admin: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    let customer = users::ActiveModel {
        id: Set(Id::new_v4()),
        name: Set("Jo Bloggs".to_owned()),
        email: Set("jo@garage.local".to_owned()),
        phone: Set("07700 900123".to_owned()),
        password: Set(user::generate_hash("password".to_owned())),
        is_admin: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    appointment::create(
        db,
        customer.id,
        (now + Duration::days(2)).into(),
        Some("Annual service".to_owned()),
    )
    .await?;

    appointment::create(
        db,
        customer.id,
        (now + Duration::days(9)).into(),
        Some("Rattle from the rear axle".to_owned()),
    )
    .await?;

    Ok(())
}
