// connexion BD + création du schéma

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};
use std::path::Path;
use tracing::info;

use crate::models::{courses, reviews, users};

/// Ouvre la base SQLite au chemin donné, en créant le dossier parent si besoin
pub async fn establish_connection(db_path: &str) -> Result<DatabaseConnection, DbErr> {
    if let Some(dir) = Path::new(db_path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| DbErr::Custom(format!("Failed to create {}: {}", dir.display(), e)))?;
    }

    let database_url = format!("sqlite://{}?mode=rwc", db_path);
    info!(path = %db_path, "opening database");
    Database::connect(&database_url).await
}

/// Crée les tables manquantes à partir des entités (CREATE TABLE IF NOT EXISTS)
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, courses::Entity).await?;
    create_table(db, reviews::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn create_test_database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("unable to create test database");

    create_schema(&db).await.expect("unable to create schema");

    db
}
