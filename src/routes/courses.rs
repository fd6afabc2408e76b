use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::{CurrentUser, SessionContext};
use crate::models::courses;
use crate::models::dto::{CourseSummary, Flash, SessionUser};
use crate::models::reviews;
use crate::routes::{redirect, FirstValues};
use crate::services::course_query::{self, CourseFilter, CourseFilterParams, Level};
use crate::services::review_service::{self, FormValue, ReviewForm, SubmissionMode};

// Page d'accueil : catalogue filtré + valeurs pour les listes déroulantes
#[derive(Serialize)]
pub struct HomePage {
    pub courses: Vec<CourseSummary>,
    pub departments: Vec<String>,
    pub levels: Vec<i32>,
    pub search: String,
    pub department: String,
    pub level: String,
    pub minrating: String,
    pub home_warning: String,
    pub current_user: Option<SessionUser>,
    pub flash: Option<Flash>,
}

// Cours avec son niveau dérivé
#[derive(Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: courses::Model,
    pub level: Option<i32>,
}

impl From<courses::Model> for CourseDetail {
    fn from(course: courses::Model) -> Self {
        let level = course.level();
        Self { course, level }
    }
}

#[derive(Serialize)]
pub struct CourseDetailPage {
    pub course: Option<CourseDetail>,
    pub reviews: Vec<reviews::Model>,
    pub saved: bool,
    pub savetype: String,
    pub mode: SubmissionMode,
    pub form_error: String,
    pub form_value: FormValue,
    pub current_user: Option<SessionUser>,
}

impl CourseDetailPage {
    fn not_found(current_user: Option<SessionUser>) -> Self {
        Self {
            course: None,
            reviews: Vec::new(),
            saved: false,
            savetype: String::new(),
            mode: SubmissionMode::default(),
            form_error: String::new(),
            form_value: FormValue::default(),
            current_user,
        }
    }
}

// Paramètres de la page détail après redirection
#[derive(Debug, Default)]
pub struct DetailQuery {
    pub saved: Option<String>,
    pub savetype: Option<String>,
    pub mode: Option<String>,
}

impl From<&FirstValues> for DetailQuery {
    fn from(values: &FirstValues) -> Self {
        Self {
            saved: values.get("saved"),
            savetype: values.get("savetype"),
            mode: values.get("mode"),
        }
    }
}

fn filter_params(values: &FirstValues) -> CourseFilterParams {
    CourseFilterParams {
        search: values.get("search"),
        department: values.get("department"),
        level: values.get("level"),
        minrating: values.get("minrating"),
    }
}

fn review_form(values: &FirstValues) -> ReviewForm {
    ReviewForm {
        actiontype: values.get("actiontype"),
        overall: values.get("overall"),
        difficulty: values.get("difficulty"),
        workload: values.get("workload"),
        interest: values.get("interest"),
        reviewtext: values.get("reviewtext"),
        semester: values.get("semester"),
    }
}

/// GET / - Catalogue avec filtres optionnels
#[get("/")]
pub async fn home(
    current_user: CurrentUser,
    session: SessionContext,
    query: web::Query<Vec<(String, String)>>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let params = filter_params(&FirstValues::from(query.into_inner()));
    let normalized = CourseFilter::from_params(&params);
    let filter = &normalized.filter;

    let courses = course_query::find_courses(db.get_ref(), filter).await?;
    let departments = course_query::list_departments(db.get_ref()).await?;
    let levels = course_query::list_levels(db.get_ref()).await?;

    // Une note minimale rejetée n'est pas renvoyée au formulaire
    let minrating = match normalized.warning {
        Some(_) => String::new(),
        None => params.minrating.as_deref().unwrap_or("").trim().to_string(),
    };

    Ok(HttpResponse::Ok().json(HomePage {
        courses,
        departments,
        levels,
        search: filter.search.clone().unwrap_or_default(),
        department: filter.department.clone().unwrap_or_default(),
        level: filter.level.map(Level::as_text).unwrap_or_default(),
        minrating,
        home_warning: normalized.warning.unwrap_or("").to_string(),
        current_user: current_user.0,
        flash: session.take_flash(),
    }))
}

/// GET /course/{id} - Détail d'un cours et de ses avis
#[get("/course/{id}")]
pub async fn course_detail(
    current_user: CurrentUser,
    path: web::Path<i32>,
    query: web::Query<Vec<(String, String)>>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();
    let query = DetailQuery::from(&FirstValues::from(query.into_inner()));
    render_detail(db.get_ref(), course_id, current_user.0, &query, None).await
}

/// POST /course/{id} - Soumission d'un avis ou d'une note seule
#[post("/course/{id}")]
pub async fn submit_review(
    current_user: CurrentUser,
    path: web::Path<i32>,
    query: web::Query<Vec<(String, String)>>,
    form: Option<web::Form<Vec<(String, String)>>>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();

    // Cours inconnu : 404 avant toute lecture du formulaire
    if course_query::find_course(db.get_ref(), course_id).await?.is_none() {
        return Ok(HttpResponse::NotFound().json(CourseDetailPage::not_found(current_user.0)));
    }

    let query = DetailQuery::from(&FirstValues::from(query.into_inner()));
    let form = review_form(&form.map(|f| FirstValues::from(f.into_inner())).unwrap_or_default());
    let mode = SubmissionMode::parse(form.actiontype.as_deref().unwrap_or(""));
    let value = FormValue::from(&form);

    match review_service::validate_review(mode, &value) {
        Ok(review) => {
            review_service::insert_review(db.get_ref(), course_id, &review).await?;
            Ok(redirect(&format!("/course/{course_id}?saved=1&savetype={mode}")))
        }
        Err(message) => {
            let rejected = Rejected { mode, message, value };
            render_detail(db.get_ref(), course_id, current_user.0, &query, Some(rejected)).await
        }
    }
}

// Soumission refusée, réaffichée dans la page
struct Rejected {
    mode: SubmissionMode,
    message: &'static str,
    value: FormValue,
}

async fn render_detail(
    db: &DatabaseConnection,
    course_id: i32,
    current_user: Option<SessionUser>,
    query: &DetailQuery,
    rejected: Option<Rejected>,
) -> Result<HttpResponse, AppError> {
    let Some(course) = course_query::find_course(db, course_id).await? else {
        return Ok(HttpResponse::NotFound().json(CourseDetailPage::not_found(current_user)));
    };

    let reviews = review_service::list_reviews(db, course_id).await?;
    let query_mode = SubmissionMode::parse(query.mode.as_deref().unwrap_or(""));
    let (mode, form_error, form_value) = match rejected {
        Some(r) => (r.mode, r.message.to_string(), r.value),
        None => (query_mode, String::new(), FormValue::default()),
    };

    Ok(HttpResponse::Ok().json(CourseDetailPage {
        course: Some(CourseDetail::from(course)),
        reviews,
        saved: query.saved.as_deref() == Some("1"),
        savetype: query.savetype.as_deref().unwrap_or("").trim().to_string(),
        mode,
        form_error,
        form_value,
        current_user,
    }))
}

pub fn courses_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home).service(course_detail).service(submit_review);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_database;
    use crate::middleware::session::test_utils::test_session_middleware;
    use crate::routes::configure_routes;
    use crate::routes::test_utils::location;
    use crate::services::course_query::test_utils::{insert_course, insert_rating};
    use crate::services::review_service::{RATING_FIELDS_ERROR, RATING_ONLY_PLACEHOLDER, REVIEW_TEXT_ERROR};
    use actix_web::{http::StatusCode, test, App};

    macro_rules! init_app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($db))
                    .wrap(test_session_middleware())
                    .configure(configure_routes),
            )
            .await
        };
    }

    fn submission<'a>(mode: &'a str, overall: &'a str, text: &'a str) -> [(&'a str, &'a str); 7] {
        [
            ("actiontype", mode),
            ("overall", overall),
            ("difficulty", "3"),
            ("workload", "3"),
            ("interest", "4"),
            ("reviewtext", text),
            ("semester", " Fall 2025 "),
        ]
    }

    #[actix_web::test]
    async fn test_home_lists_filtered_catalog() {
        let db = create_test_database().await;
        let cs = insert_course(&db, "CS350", "Data Structures", "Computer Science", Some("Dr. Thompson")).await;
        insert_course(&db, "MA100", "Algebra", "Mathematics", None).await;
        insert_rating(&db, cs.id, 5).await;
        let app = init_app!(db);

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/").to_request(),
        )
        .await;
        assert_eq!(body["courses"].as_array().unwrap().len(), 2);
        assert_eq!(body["departments"], serde_json::json!(["Computer Science", "Mathematics"]));
        assert_eq!(body["levels"], serde_json::json!([100, 300]));
        assert_eq!(body["home_warning"], "");
        assert!(body["current_user"].is_null());
        assert!(body["flash"].is_null());

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/?search=+data+&level=300&minrating=4.5")
                .to_request(),
        )
        .await;
        assert_eq!(body["courses"][0]["course_code"], "CS350");
        assert_eq!(body["courses"][0]["avg_rating"], 5.0);
        assert_eq!(body["courses"][0]["review_count"], 1);
        assert_eq!(body["search"], "data");
        assert_eq!(body["level"], "300");
        assert_eq!(body["minrating"], "4.5");
    }

    #[actix_web::test]
    async fn test_home_warns_on_bad_min_rating() {
        let db = create_test_database().await;
        insert_course(&db, "CS350", "Data Structures", "Computer Science", None).await;
        let app = init_app!(db);

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/?minrating=9&level=abc").to_request(),
        )
        .await;
        assert_eq!(body["home_warning"], course_query::MIN_RATING_WARNING);
        assert_eq!(body["minrating"], "");
        assert_eq!(body["level"], "");
        assert_eq!(body["courses"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_repeated_query_keys_keep_first_value() {
        let db = create_test_database().await;
        insert_course(&db, "CS350", "Data Structures", "Computer Science", None).await;
        insert_course(&db, "MA200", "Calculus", "Mathematics", None).await;
        let app = init_app!(db);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/?level=300&level=200").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["level"], "300");
        assert_eq!(body["courses"].as_array().unwrap().len(), 1);
        assert_eq!(body["courses"][0]["course_code"], "CS350");

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/?minrating=x&minrating=2&search=a&search=b").to_request(),
        )
        .await;
        assert_eq!(body["home_warning"], course_query::MIN_RATING_WARNING);
        assert_eq!(body["search"], "a");
    }

    #[actix_web::test]
    async fn test_unknown_course_is_404() {
        let db = create_test_database().await;
        let app = init_app!(db);

        let res = test::call_service(&app, test::TestRequest::get().uri("/course/42").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert!(body["course"].is_null());
        assert_eq!(body["reviews"], serde_json::json!([]));

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/course/42")
                .set_form(submission("review", "5", "Great course, highly recommend it."))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = test::call_service(&app, test::TestRequest::get().uri("/course/abc").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_review_submission_redirects_then_shows_review() {
        let db = create_test_database().await;
        let course = insert_course(&db, "CS350", "Data Structures", "Computer Science", None).await;
        let app = init_app!(db);
        let uri = format!("/course/{}", course.id);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&uri)
                .set_form(submission("review", "5", "Great course, highly recommend it."))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        let target = location(&res).expect("redirect target");
        assert_eq!(target, format!("{uri}?saved=1&savetype=review"));

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri(&target).to_request(),
        )
        .await;
        assert_eq!(body["saved"], true);
        assert_eq!(body["savetype"], "review");
        assert_eq!(body["mode"], "review");
        assert_eq!(body["course"]["course_code"], "CS350");
        assert_eq!(body["course"]["level"], 300);
        assert_eq!(body["reviews"][0]["overall_rating"], 5);
        assert_eq!(body["reviews"][0]["semester"], "Fall 2025");
    }

    #[actix_web::test]
    async fn test_rating_only_submission_uses_placeholder() {
        let db = create_test_database().await;
        let course = insert_course(&db, "CS350", "Data Structures", "Computer Science", None).await;
        let app = init_app!(db);
        let uri = format!("/course/{}", course.id);

        let res = test::call_service(
            &app,
            test::TestRequest::post().uri(&uri).set_form(submission("rating", "4", "")).to_request(),
        )
        .await;
        assert_eq!(location(&res), Some(format!("{uri}?saved=1&savetype=rating")));

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri(&format!("{uri}?mode=rating")).to_request(),
        )
        .await;
        assert_eq!(body["mode"], "rating");
        assert_eq!(body["saved"], false);
        assert_eq!(body["reviews"][0]["review_text"], RATING_ONLY_PLACEHOLDER);
    }

    #[actix_web::test]
    async fn test_rejected_submission_echoes_form() {
        let db = create_test_database().await;
        let course = insert_course(&db, "CS350", "Data Structures", "Computer Science", None).await;
        let app = init_app!(db);
        let uri = format!("/course/{}", course.id);

        let res = test::call_service(
            &app,
            test::TestRequest::post().uri(&uri).set_form(submission("review", "4", "too short")).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["form_error"], REVIEW_TEXT_ERROR);
        assert_eq!(body["form_value"]["reviewtext"], "too short");
        assert_eq!(body["form_value"]["semester"], "Fall 2025");
        assert_eq!(body["reviews"], serde_json::json!([]));

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post().uri(&uri).set_form(submission("delete", "6", "")).to_request(),
        )
        .await;
        assert_eq!(body["form_error"], RATING_FIELDS_ERROR);
        assert_eq!(body["mode"], "review");
    }
}
