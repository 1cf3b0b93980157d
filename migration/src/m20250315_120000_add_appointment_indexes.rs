use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Customers list their own bookings, admins list everything by date
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_appointments_user_id_datetime")
                    .table((Alias::new("garage"), Alias::new("appointments")))
                    .col(Alias::new("user_id"))
                    .col(Alias::new("datetime"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_appointments_datetime")
                    .table((Alias::new("garage"), Alias::new("appointments")))
                    .col(Alias::new("datetime"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DROP INDEX IF EXISTS garage.idx_appointments_datetime; \
                 DROP INDEX IF EXISTS garage.idx_appointments_user_id_datetime;",
            )
            .await?;

        Ok(())
    }
}
