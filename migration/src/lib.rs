pub use sea_orm_migration::prelude::*;

mod m20250301_090000_create_schema;
mod m20250301_091500_create_users_and_appointments;
mod m20250315_120000_add_appointment_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_090000_create_schema::Migration),
            Box::new(m20250301_091500_create_users_and_appointments::Migration),
            Box::new(m20250315_120000_add_appointment_indexes::Migration),
        ]
    }
}
