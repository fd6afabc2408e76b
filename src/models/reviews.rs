use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Avis sur un cours. Append-only : aucune route de modification ni de suppression
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "courseid")]
    pub course_id: i32,
    // Les quatre notes sont validées dans [1, 5] avant insertion
    #[sea_orm(column_name = "overallrating")]
    pub overall_rating: i32,
    pub difficulty: i32,
    pub workload: i32,
    pub interest: i32,
    #[sea_orm(column_name = "reviewtext")]
    pub review_text: String,
    pub semester: Option<String>,
    #[sea_orm(column_name = "dateposted")]
    pub date_posted: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
