// ============================================================================
// MODÈLE : COURSES
// ============================================================================
//
// Colonnes de la table courses:
//   - id (INTEGER, PRIMARY KEY, AUTOINCREMENT)
//   - coursecode (TEXT, NOT NULL) - ex: "CS350", "MA200"
//   - coursename (TEXT, NOT NULL)
//   - department (TEXT, NOT NULL)
//   - professor (TEXT, NULL)
//   - description (TEXT, NULL)
//
// Points d'attention:
//   - Le niveau (100, 200, 300...) n'est PAS stocké : il est dérivé du
//     3e caractère du code (voir course_level)
//   - Les cours sont créés uniquement au seed, jamais modifiés ensuite
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "coursecode")]
    pub course_code: String,
    #[sea_orm(column_name = "coursename")]
    pub course_name: String,
    pub department: String,
    pub professor: Option<String>,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn level(&self) -> Option<i32> {
        course_level(&self.course_code)
    }
}

/// Niveau dérivé du code de cours : 3e caractère chiffre `d` => `d * 100`
/// Renvoie None si le code n'a pas de chiffre à cette position
pub fn course_level(course_code: &str) -> Option<i32> {
    course_code
        .chars()
        .nth(2)
        .and_then(|c| c.to_digit(10))
        .map(|d| d as i32 * 100)
}
