use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS garage;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO garage, public;")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // CASCADE removes every table and type living in the schema
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS garage CASCADE;")
            .await?;

        Ok(())
    }
}
