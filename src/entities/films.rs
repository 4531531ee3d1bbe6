use sea_orm::entity::prelude::*;

// Ids come from the process-wide allocator, not the database.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "films")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub release_date: Date,
    pub duration: i32,
    pub rate: i32,
    pub mpa_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mpa_ratings::Entity",
        from = "Column::MpaId",
        to = "super::mpa_ratings::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    MpaRatings,
}

impl Related<super::mpa_ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MpaRatings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
