// ============================================================================
// SERVICE : INITIALISATION DE LA BASE
// ============================================================================
//
// Description:
//   Crée les tables manquantes, importe le catalogue de cours depuis un CSV
//   (uniquement sur une base vide) et crée l'utilisateur admin s'il n'existe pas.
//
// Format du CSV:
//   - En-têtes normalisés : "_" et "-" supprimés ("course_code" => "coursecode")
//   - coursecode, title, fulldescription, sectionblurb
//   - Département déduit des 2 premières lettres du code
//   - Professeur attribué en round-robin depuis PROFESSOR_POOL
//
// Points d'attention:
//   - Relancer le seed ne réimporte pas les cours et ne modifie pas l'admin
//   - Import du catalogue dans une seule transaction : tout ou rien
//   - Avis de démonstration (data/sample_reviews.csv) sur une table reviews
//     vide, uniquement pour les cours présents
//
// ============================================================================

use sea_orm::sea_query::{Expr, Func, Order, SimpleExpr};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::models::courses::{self, ActiveModel as CourseActiveModel, Entity as Course};
use crate::models::reviews::{ActiveModel as ReviewActiveModel, Entity as Review};
use crate::models::users::{self, ActiveModel as UserActiveModel, Entity as Users};
use crate::utils::password;

const DEFAULT_DESCRIPTION: &str = "A Choate Rosemary Hall course.";
const MAX_DESCRIPTION_CHARS: usize = 500;
const INSERT_CHUNK: usize = 100;
const SAMPLE_REVIEWS: &str = include_str!("../../data/sample_reviews.csv");

const PROFESSOR_POOL: [&str; 36] = [
    "Dr. Thompson", "Ms. Rodriguez", "Mr. Chen", "Dr. Martinez", "Prof. Blake", "Dr. Harrison",
    "Ms. Williams", "Mr. Johnson", "Dr. Anderson", "Ms. Lee", "Prof. Kumar", "Dr. Zhang",
    "Mr. Brown", "Dr. Green", "Ms. Clark", "Prof. Walker", "Dr. Adams", "Ms. Rivera",
    "Mr. Collins", "Dr. Foster", "Prof. Bennett", "Dr. Patel", "Ms. Singh", "Mr. Davis",
    "Dr. Wilson", "Ms. Morgan", "Prof. Taylor", "Dr. Romano", "Ms. Wang", "Mr. Garcia",
    "Dr. Nakamura", "Prof. Hernandez", "Dr. Dubois", "Ms. Kim", "Mr. Miller", "Prof. Jones",
];

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Catalog CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot open catalog {path}: {source}")]
    CatalogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Résumé de l'initialisation, loggé au démarrage
#[derive(Debug, Clone, PartialEq)]
pub struct SeedSummary {
    pub added_courses: usize,
    pub added_reviews: usize,
    pub admin_created: bool,
    pub top_departments: Vec<(String, i64)>,
}

/// Département à partir du préfixe de 2 lettres du code de cours
pub fn department_from_code(course_code: &str) -> &'static str {
    let prefix: String = course_code.chars().take(2).collect();
    match prefix.as_str() {
        "AR" => "Languages - Arabic",
        "AS" => "Advanced Studies",
        "BI" => "Science - Biology",
        "CH" => "Science - Chemistry",
        "CN" => "Languages - Chinese",
        "CS" => "Computer Science",
        "DA" => "Arts - Dance",
        "EC" => "Economics",
        "EI" => "Environmental Immersion",
        "EN" => "English",
        "FR" => "Languages - French",
        "HI" => "History",
        "LA" => "Languages - Latin",
        "MA" => "Mathematics",
        "MD" => "Multidisciplinary",
        "MU" => "Arts - Music",
        "PH" => "Science - Physics",
        "PL" => "Philosophy",
        "RL" => "Religion",
        "SC" => "Science",
        "SP" => "Languages - Spanish",
        "SS" => "Social Sciences",
        "TA" => "Arts - Theater",
        "VA" => "Arts - Visual Arts",
        _ => "General",
    }
}

fn clean_key(key: &str) -> String {
    key.chars().filter(|c| *c != '_' && *c != '-').collect()
}

fn cap_description(description: &str) -> String {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        let head: String = description.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

/// Lit le catalogue CSV et prépare une ligne `courses` par enregistrement
pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<CourseActiveModel>, csv::Error> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(clean_key).collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let code_idx = column("coursecode");
    let title_idx = column("title");
    let full_idx = column("fulldescription");
    let blurb_idx = column("sectionblurb");

    let mut courses = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let course_code = field(code_idx).trim().to_string();
        let description = [field(full_idx), field(blurb_idx)]
            .into_iter()
            .find(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
            .trim();

        courses.push(CourseActiveModel {
            department: Set(department_from_code(&course_code).to_string()),
            course_name: Set(field(title_idx).trim().to_string()),
            description: Set(Some(cap_description(description))),
            professor: Set(Some(PROFESSOR_POOL[index % PROFESSOR_POOL.len()].to_string())),
            course_code: Set(course_code),
            ..Default::default()
        });
    }

    Ok(courses)
}

/// Importe le catalogue uniquement si la table courses est vide
pub async fn import_courses<R: Read>(db: &DatabaseConnection, reader: R) -> Result<usize, SeedError> {
    if Course::find().count(db).await? > 0 {
        info!("courses already present, skipping catalog import");
        return Ok(0);
    }

    let batch = parse_catalog(reader)?;

    // Un échec sur un lot annule tout : la base reste vide et l'import sera retenté
    let txn = db.begin().await?;
    // Lots de 100 pour rester sous la limite de paramètres SQLite
    for chunk in batch.chunks(INSERT_CHUNK) {
        if let Err(e) = Course::insert_many(chunk.to_vec()).exec(&txn).await {
            txn.rollback().await?;
            return Err(e.into());
        }
    }
    txn.commit().await?;

    Ok(batch.len())
}

// Ligne de data/sample_reviews.csv
#[derive(Debug, Deserialize)]
struct SampleReview {
    courseid: i32,
    overallrating: i32,
    difficulty: i32,
    workload: i32,
    interest: i32,
    reviewtext: String,
    semester: String,
}

/// Avis de démonstration, insérés seulement si la table reviews est vide
pub async fn seed_sample_reviews(db: &DatabaseConnection) -> Result<usize, SeedError> {
    if Review::find().count(db).await? > 0 {
        return Ok(0);
    }

    let samples = csv::Reader::from_reader(SAMPLE_REVIEWS.as_bytes())
        .deserialize::<SampleReview>()
        .collect::<Result<Vec<_>, _>>()?;

    let known: HashSet<i32> = Course::find()
        .select_only()
        .column(courses::Column::Id)
        .filter(courses::Column::Id.is_in(samples.iter().map(|r| r.courseid)))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let now = Utc::now().naive_utc();
    let rows: Vec<ReviewActiveModel> = samples
        .into_iter()
        .filter(|r| known.contains(&r.courseid))
        .map(|r| ReviewActiveModel {
            course_id: Set(r.courseid),
            overall_rating: Set(r.overallrating),
            difficulty: Set(r.difficulty),
            workload: Set(r.workload),
            interest: Set(r.interest),
            review_text: Set(r.reviewtext),
            semester: Set(Some(r.semester)),
            date_posted: Set(now),
            ..Default::default()
        })
        .collect();

    if rows.is_empty() {
        return Ok(0);
    }

    let added = rows.len();
    Review::insert_many(rows).exec(db).await?;
    Ok(added)
}

/// Crée l'utilisateur admin s'il n'existe pas ; ne modifie jamais un compte existant
pub async fn ensure_admin(db: &DatabaseConnection, username: &str, raw_password: &str) -> Result<bool, DbErr> {
    let existing = Users::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?;

    if existing.is_some() {
        return Ok(false);
    }

    UserActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password::hash_password(raw_password)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(true)
}

/// Départements triés par nombre de cours (15 max)
pub async fn top_departments(db: &DatabaseConnection) -> Result<Vec<(String, i64)>, DbErr> {
    Course::find()
        .select_only()
        .column(courses::Column::Department)
        .column_as(SimpleExpr::from(Func::count(Expr::col(courses::Column::Id))), "countvalue")
        .group_by(courses::Column::Department)
        .order_by(Expr::cust("countvalue"), Order::Desc)
        .order_by_asc(courses::Column::Department)
        .limit(15)
        .into_tuple::<(String, i64)>()
        .all(db)
        .await
}

/// Initialisation complète : schéma, catalogue, admin
pub async fn build_database(db: &DatabaseConnection, config: &AppConfig) -> Result<SeedSummary, SeedError> {
    crate::db::create_schema(db).await?;

    let added_courses = match &config.course_csv_path {
        Some(path) => {
            let file = File::open(path).map_err(|source| SeedError::CatalogFile {
                path: path.clone(),
                source,
            })?;
            import_courses(db, file).await?
        }
        None => 0,
    };

    let summary = SeedSummary {
        added_courses,
        added_reviews: seed_sample_reviews(db).await?,
        admin_created: ensure_admin(db, &config.admin_username, &config.admin_password).await?,
        top_departments: top_departments(db).await?,
    };

    info!(
        added_courses = summary.added_courses,
        added_reviews = summary.added_reviews,
        "database ready"
    );
    if summary.admin_created {
        info!(username = %config.admin_username, "created login user");
    } else {
        info!(username = %config.admin_username, "login user already exists");
    }
    for (department, count) in &summary.top_departments {
        info!(%department, count, "department");
    }

    Ok(summary)
}
