use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use std::fmt;
use tracing::info;

use crate::models::reviews::{self, ActiveModel as ReviewActiveModel, Entity as Review};

pub const RATING_FIELDS_ERROR: &str = "All rating fields must be whole numbers from 1 to 5.";
pub const REVIEW_TEXT_ERROR: &str = "Review text must be at least 10 characters.";
pub const RATING_ONLY_PLACEHOLDER: &str = "Rating only submission.";

const MIN_REVIEW_TEXT_CHARS: usize = 10;

/// Mode de soumission : avis complet ou note seule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionMode {
    #[default]
    Review,
    Rating,
}

impl SubmissionMode {
    /// Valeur inconnue ou absente => mode "review"
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "rating" => Self::Rating,
            _ => Self::Review,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Rating => "rating",
        }
    }
}

impl fmt::Display for SubmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// DTO du formulaire POST /course/{id}
#[derive(Debug, Default, Clone)]
pub struct ReviewForm {
    pub actiontype: Option<String>,
    pub overall: Option<String>,
    pub difficulty: Option<String>,
    pub workload: Option<String>,
    pub interest: Option<String>,
    pub reviewtext: Option<String>,
    pub semester: Option<String>,
}

/// Valeurs du formulaire après trim, renvoyées à la page en cas d'erreur
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FormValue {
    pub overall: String,
    pub difficulty: String,
    pub workload: String,
    pub interest: String,
    pub reviewtext: String,
    pub semester: String,
}

impl From<&ReviewForm> for FormValue {
    fn from(form: &ReviewForm) -> Self {
        let field = |value: &Option<String>| value.as_deref().unwrap_or("").trim().to_string();
        Self {
            overall: field(&form.overall),
            difficulty: field(&form.difficulty),
            workload: field(&form.workload),
            interest: field(&form.interest),
            reviewtext: field(&form.reviewtext),
            semester: field(&form.semester),
        }
    }
}

/// Avis validé, prêt à être inséré
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedReview {
    pub mode: SubmissionMode,
    pub overall: i32,
    pub difficulty: i32,
    pub workload: i32,
    pub interest: i32,
    pub review_text: String,
    pub semester: String,
}

fn parse_star(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok().filter(|v| (1..=5).contains(v))
}

/// Valide un formulaire ; renvoie le message d'erreur à afficher en cas de rejet
pub fn validate_review(mode: SubmissionMode, value: &FormValue) -> Result<ValidatedReview, &'static str> {
    // Les quatre notes sont validées ensemble : pas d'acceptation partielle
    let stars = (
        parse_star(&value.overall),
        parse_star(&value.difficulty),
        parse_star(&value.workload),
        parse_star(&value.interest),
    );
    let (Some(overall), Some(difficulty), Some(workload), Some(interest)) = stars else {
        return Err(RATING_FIELDS_ERROR);
    };

    let review_text = match mode {
        SubmissionMode::Review if value.reviewtext.chars().count() < MIN_REVIEW_TEXT_CHARS => {
            return Err(REVIEW_TEXT_ERROR);
        }
        SubmissionMode::Rating if value.reviewtext.is_empty() => RATING_ONLY_PLACEHOLDER.to_string(),
        _ => value.reviewtext.clone(),
    };

    Ok(ValidatedReview {
        mode,
        overall,
        difficulty,
        workload,
        interest,
        review_text,
        semester: value.semester.clone(),
    })
}

/// Insère un avis validé, avec date de création attribuée à l'insertion
pub async fn insert_review(
    db: &DatabaseConnection,
    course_id: i32,
    review: &ValidatedReview,
) -> Result<reviews::Model, DbErr> {
    let new_review = ReviewActiveModel {
        course_id: Set(course_id),
        overall_rating: Set(review.overall),
        difficulty: Set(review.difficulty),
        workload: Set(review.workload),
        interest: Set(review.interest),
        review_text: Set(review.review_text.clone()),
        semester: Set(Some(review.semester.clone())),
        date_posted: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    let saved = new_review.insert(db).await?;
    info!(course_id, review_id = saved.id, mode = %review.mode, "review saved");
    Ok(saved)
}

/// Avis d'un cours, du plus récent au plus ancien
pub async fn list_reviews(db: &DatabaseConnection, course_id: i32) -> Result<Vec<reviews::Model>, DbErr> {
    Review::find()
        .filter(reviews::Column::CourseId.eq(course_id))
        .order_by_desc(reviews::Column::DatePosted)
        .order_by_desc(reviews::Column::Id)
        .all(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_database;
    use crate::services::course_query::test_utils::insert_course;
    use sea_orm::PaginatorTrait;

    fn form_value(overall: &str, text: &str) -> FormValue {
        FormValue {
            overall: overall.to_string(),
            difficulty: "3".to_string(),
            workload: "3".to_string(),
            interest: "4".to_string(),
            reviewtext: text.to_string(),
            semester: "Fall 2025".to_string(),
        }
    }

    #[test]
    fn test_mode_parse_defaults_to_review() {
        assert_eq!(SubmissionMode::parse("rating"), SubmissionMode::Rating);
        assert_eq!(SubmissionMode::parse(" rating "), SubmissionMode::Rating);
        assert_eq!(SubmissionMode::parse("review"), SubmissionMode::Review);
        assert_eq!(SubmissionMode::parse("delete"), SubmissionMode::Review);
        assert_eq!(SubmissionMode::parse(""), SubmissionMode::Review);
    }

    #[test]
    fn test_form_value_is_trimmed() {
        let form = ReviewForm {
            overall: Some(" 5 ".to_string()),
            reviewtext: Some("  hello  ".to_string()),
            ..Default::default()
        };
        let value = FormValue::from(&form);

        assert_eq!(value.overall, "5");
        assert_eq!(value.reviewtext, "hello");
        assert_eq!(value.semester, "");
    }

    #[test]
    fn test_rating_fields_are_validated_together() {
        for bad in ["6", "0", "", "4.5", "five"] {
            let result = validate_review(SubmissionMode::Review, &form_value(bad, "Great course, highly recommend it."));
            assert_eq!(result, Err(RATING_FIELDS_ERROR), "overall={bad:?}");
        }

        let mut value = form_value("5", "Great course, highly recommend it.");
        value.interest = "9".to_string();
        assert_eq!(validate_review(SubmissionMode::Rating, &value), Err(RATING_FIELDS_ERROR));
    }

    #[test]
    fn test_review_mode_requires_ten_characters() {
        assert_eq!(
            validate_review(SubmissionMode::Review, &form_value("4", "too short")),
            Err(REVIEW_TEXT_ERROR)
        );
        assert_eq!(
            validate_review(SubmissionMode::Review, &form_value("4", "")),
            Err(REVIEW_TEXT_ERROR)
        );

        let ok = validate_review(SubmissionMode::Review, &form_value("4", "ten chars!")).unwrap();
        assert_eq!(ok.review_text, "ten chars!");
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 9 caractères, mais plus de 10 octets
        assert_eq!(
            validate_review(SubmissionMode::Review, &form_value("4", "éééééééé!")),
            Err(REVIEW_TEXT_ERROR)
        );
    }

    #[test]
    fn test_rating_mode_placeholder() {
        let empty = validate_review(SubmissionMode::Rating, &form_value("4", "")).unwrap();
        assert_eq!(empty.review_text, RATING_ONLY_PLACEHOLDER);
        assert_eq!(empty.mode, SubmissionMode::Rating);

        let short = validate_review(SubmissionMode::Rating, &form_value("4", "too short")).unwrap();
        assert_eq!(short.review_text, "too short");
    }

    #[tokio::test]
    async fn test_saved_review_is_listed_newest_first() {
        let db = create_test_database().await;
        let course = insert_course(&db, "CS350", "Data Structures", "Computer Science", None).await;

        let first = validate_review(SubmissionMode::Rating, &form_value("3", "")).unwrap();
        insert_review(&db, course.id, &first).await.unwrap();

        let second = validate_review(
            SubmissionMode::Review,
            &FormValue {
                overall: "5".to_string(),
                difficulty: "3".to_string(),
                workload: "3".to_string(),
                interest: "4".to_string(),
                reviewtext: "Great course, highly recommend it.".to_string(),
                semester: "Fall 2025".to_string(),
            },
        )
        .unwrap();
        let saved = insert_review(&db, course.id, &second).await.unwrap();

        let listed = list_reviews(&db, course.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(listed[0].overall_rating, 5);
        assert_eq!(listed[0].review_text, "Great course, highly recommend it.");
        assert_eq!(listed[0].semester.as_deref(), Some("Fall 2025"));
        assert_eq!(listed[1].review_text, RATING_ONLY_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_rejected_review_is_not_persisted() {
        let db = create_test_database().await;
        insert_course(&db, "CS350", "Data Structures", "Computer Science", None).await;

        let result = validate_review(SubmissionMode::Review, &form_value("6", "Great course, highly recommend it."));
        assert!(result.is_err());
        assert_eq!(Review::find().count(&db).await.unwrap(), 0);
    }
}
