use crate::entities::prelude::*;
use crate::storage::{reference_genres, reference_ratings};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Seeds the closed MPA rating and genre reference tables. The rows
// mirror the in-memory backend's seed exactly so both backends enforce
// the same reference-integrity checks.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut ratings = Query::insert()
            .into_table(MpaRatings)
            .columns([
                crate::entities::mpa_ratings::Column::Id,
                crate::entities::mpa_ratings::Column::Name,
            ])
            .to_owned();
        for rating in reference_ratings() {
            ratings.values_panic([rating.id.into(), rating.name.into()]);
        }
        manager.exec_stmt(ratings).await?;

        let mut genres = Query::insert()
            .into_table(Genres)
            .columns([
                crate::entities::genres::Column::Id,
                crate::entities::genres::Column::Name,
            ])
            .to_owned();
        for genre in reference_genres() {
            genres.values_panic([genre.id.into(), genre.name.into()]);
        }
        manager.exec_stmt(genres).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let clear_genres = Query::delete().from_table(Genres).to_owned();
        manager.exec_stmt(clear_genres).await?;

        let clear_ratings = Query::delete().from_table(MpaRatings).to_owned();
        manager.exec_stmt(clear_ratings).await?;

        Ok(())
    }
}
