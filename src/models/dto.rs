//pour les réponses structurées
use sea_orm::FromQueryResult;
use serde::Serialize;

// 1 ligne agrégée par cours : métadonnées + moyenne et nombre d'avis
#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct CourseSummary {
    pub id: i32,
    pub course_code: String,
    pub course_name: String,
    pub department: String,
    pub professor: Option<String>,
    pub description: Option<String>,
    pub level: Option<i32>,
    pub avg_rating: Option<f64>, // NULL si aucun avis
    pub review_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub total_courses: u64,
    pub total_reviews: u64,
    pub average_overall: Option<f64>,
}

// Utilisateur connecté, tel qu'exposé aux pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flash {
    pub message: String,
    pub category: String,
}
