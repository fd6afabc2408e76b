// ============================================================================
// SERVICE : REQUÊTE CATALOGUE (filtres + agrégation des notes)
// ============================================================================
//
// Description:
//   Transforme les filtres optionnels de la page d'accueil (recherche,
//   département, niveau, note minimale) en une requête SeaORM paramétrée.
//
// Règles:
//   - Recherche : sous-chaîne insensible à la casse sur nom OU code OU prof
//   - Département : égalité exacte
//   - Niveau : "<chiffre>00" uniquement, sinon ignoré silencieusement
//   - Note minimale : décimal dans [1, 5], sinon ignoré AVEC avertissement
//   - Tous les filtres actifs sont combinés en AND
//   - La note minimale s'applique APRÈS agrégation (HAVING sur la moyenne)
//   - LEFT JOIN : les cours sans avis restent (moyenne NULL, count 0)
//
// ============================================================================

use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr, Order, SimpleExpr};
use sea_orm::{
    DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select,
};

use crate::models::courses::{self, Entity as Course};
use crate::models::dto::CourseSummary;
use crate::models::reviews;

pub const MIN_RATING_WARNING: &str = "Minimum rating must be between 1 and 5.";

// 3e caractère du code de cours, source du niveau dérivé
const CODE_DIGIT_SQL: &str = r#"SUBSTR("courses"."coursecode", 3, 1)"#;
const LEVEL_SQL: &str = r#"CASE WHEN SUBSTR("courses"."coursecode", 3, 1) GLOB '[0-9]' THEN CAST(SUBSTR("courses"."coursecode", 3, 1) AS INTEGER) * 100 ELSE NULL END"#;
pub(crate) const AVG_RATING_SQL: &str = r#"ROUND(AVG("reviews"."overallrating"), 2)"#;

/// Filtres bruts de la query string (`?search=&department=&level=&minrating=`)
#[derive(Debug, Default)]
pub struct CourseFilterParams {
    pub search: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
    pub minrating: Option<String>,
}

/// Niveau de cours accepté comme filtre : une centaine ("100", "300"...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level(char);

impl Level {
    /// Accepte uniquement une chaîne de 3 caractères `<chiffre>00`
    pub fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next(), chars.next(), chars.next()) {
            (Some(d), Some('0'), Some('0'), None) if d.is_ascii_digit() => Some(Self(d)),
            _ => None,
        }
    }

    pub fn value(self) -> i32 {
        (self.0 as i32 - '0' as i32) * 100
    }

    pub fn as_text(self) -> String {
        format!("{}00", self.0)
    }
}

/// Filtres normalisés ; chaque champ renseigné devient un prédicat SQL
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CourseFilter {
    pub search: Option<String>,
    pub department: Option<String>,
    pub level: Option<Level>,
    pub min_rating: Option<f64>,
}

/// Résultat de la normalisation : les filtres + un éventuel avertissement non bloquant
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFilter {
    pub filter: CourseFilter,
    pub warning: Option<&'static str>,
}

impl CourseFilter {
    pub fn from_params(params: &CourseFilterParams) -> NormalizedFilter {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let (min_rating, warning) = match text(&params.minrating) {
            None => (None, None),
            Some(raw) => match parse_min_rating(&raw) {
                Some(rating) => (Some(rating), None),
                None => (None, Some(MIN_RATING_WARNING)),
            },
        };

        NormalizedFilter {
            filter: CourseFilter {
                search: text(&params.search),
                department: text(&params.department),
                level: text(&params.level).and_then(|raw| Level::parse(&raw)),
                min_rating,
            },
            warning,
        }
    }
}

/// Note minimale : décimal fini dans [1, 5]
pub fn parse_min_rating(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|rating| (1.0..=5.0).contains(rating))
}

// Échappe les jokers LIKE pour une recherche littérale
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn search_condition(search: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(search));
    let like = || LikeExpr::new(pattern.clone()).escape('\\');

    Condition::any()
        .add(Expr::col((Course, courses::Column::CourseName)).like(like()))
        .add(Expr::col((Course, courses::Column::CourseCode)).like(like()))
        .add(Expr::col((Course, courses::Column::Professor)).like(like()))
}

fn level_condition(level: Level) -> SimpleExpr {
    Expr::cust_with_values(format!("{CODE_DIGIT_SQL} = ?"), [(level.value() / 100).to_string()])
}

fn avg_overall() -> SimpleExpr {
    Func::avg(Expr::col((reviews::Entity, reviews::Column::OverallRating))).into()
}

/// SELECT agrégé de base : une ligne par cours, LEFT JOIN sur les avis
pub(crate) fn course_summary_select() -> Select<Course> {
    Course::find()
        .select_only()
        .column_as(courses::Column::Id, "id")
        .column_as(courses::Column::CourseCode, "course_code")
        .column_as(courses::Column::CourseName, "course_name")
        .column_as(courses::Column::Department, "department")
        .column_as(courses::Column::Professor, "professor")
        .column_as(courses::Column::Description, "description")
        .column_as(Expr::cust(LEVEL_SQL), "level")
        .column_as(Expr::cust(AVG_RATING_SQL), "avg_rating")
        .column_as(
            SimpleExpr::from(Func::count(Expr::col((reviews::Entity, reviews::Column::Id)))),
            "review_count",
        )
        .join(JoinType::LeftJoin, courses::Relation::Reviews.def())
        .group_by(courses::Column::Id)
}

/// Construit la requête de la liste de cours pour un jeu de filtres
pub fn build_course_query(filter: &CourseFilter) -> Select<Course> {
    let mut condition = Condition::all();

    if let Some(search) = &filter.search {
        condition = condition.add(search_condition(search));
    }

    if let Some(department) = &filter.department {
        condition = condition.add(Expr::col((Course, courses::Column::Department)).eq(department.as_str()));
    }

    if let Some(level) = filter.level {
        condition = condition.add(level_condition(level));
    }

    let mut query = course_summary_select().filter(condition);

    if let Some(min_rating) = filter.min_rating {
        // Appliqué sur la moyenne calculée, pas sur les lignes brutes
        query = query.having(Expr::expr(avg_overall()).gte(min_rating));
    }

    query
        .order_by_asc(courses::Column::Department)
        .order_by_asc(courses::Column::CourseCode)
}

pub async fn find_courses(
    db: &DatabaseConnection,
    filter: &CourseFilter,
) -> Result<Vec<CourseSummary>, DbErr> {
    build_course_query(filter)
        .into_model::<CourseSummary>()
        .all(db)
        .await
}

/// Liste distincte des départements, triée
pub async fn list_departments(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
    Course::find()
        .select_only()
        .column(courses::Column::Department)
        .distinct()
        .order_by_asc(courses::Column::Department)
        .into_tuple::<String>()
        .all(db)
        .await
}

/// Liste distincte des niveaux dérivés ; les codes sans chiffre sont exclus
pub async fn list_levels(db: &DatabaseConnection) -> Result<Vec<i32>, DbErr> {
    Course::find()
        .select_only()
        .column_as(Expr::cust(LEVEL_SQL), "level")
        .distinct()
        .filter(Expr::cust(format!("{CODE_DIGIT_SQL} GLOB '[0-9]'")))
        .order_by(Expr::cust("level"), Order::Asc)
        .into_tuple::<i32>()
        .all(db)
        .await
}

pub async fn find_course(
    db: &DatabaseConnection,
    course_id: i32,
) -> Result<Option<courses::Model>, DbErr> {
    Course::find_by_id(course_id).one(db).await
}
