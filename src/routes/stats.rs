use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::dto::{CourseSummary, SessionUser, Totals};
use crate::services::leaderboard_service::LeaderboardService;

#[derive(Serialize)]
pub struct StatsPage {
    pub totals: Totals,
    pub most_reviewed: Vec<CourseSummary>,
    pub highest_rated: Vec<CourseSummary>,
    pub current_user: Option<SessionUser>,
}

/// GET /stats - Totaux et classements top 10
#[get("/stats")]
pub async fn stats_page(
    current_user: CurrentUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let totals = LeaderboardService::totals(db.get_ref()).await?;
    let most_reviewed = LeaderboardService::most_reviewed(db.get_ref()).await?;
    let highest_rated = LeaderboardService::highest_rated(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(StatsPage {
        totals,
        most_reviewed,
        highest_rated,
        current_user: current_user.0,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_database;
    use crate::middleware::session::test_utils::test_session_middleware;
    use crate::routes::configure_routes;
    use crate::services::course_query::test_utils::{insert_course, insert_rating};
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_stats_page() {
        let db = create_test_database().await;
        let cs = insert_course(&db, "CS350", "Data Structures", "Computer Science", None).await;
        let ma = insert_course(&db, "MA100", "Algebra", "Mathematics", None).await;
        insert_course(&db, "EN100", "Writing", "English", None).await;
        insert_rating(&db, cs.id, 5).await;
        insert_rating(&db, ma.id, 3).await;
        insert_rating(&db, ma.id, 4).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .wrap(test_session_middleware())
                .configure(configure_routes),
        )
        .await;
        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/stats").to_request(),
        )
        .await;

        assert_eq!(body["totals"]["total_courses"], 3);
        assert_eq!(body["totals"]["total_reviews"], 3);
        assert_eq!(body["totals"]["average_overall"], 4.0);
        assert_eq!(body["most_reviewed"][0]["course_code"], "MA100");
        assert_eq!(body["highest_rated"][0]["course_code"], "CS350");
        assert_eq!(body["highest_rated"].as_array().unwrap().len(), 2);
        assert!(body["current_user"].is_null());
    }

    #[actix_web::test]
    async fn test_stats_on_empty_database() {
        let db = create_test_database().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .wrap(test_session_middleware())
                .configure(configure_routes),
        )
        .await;

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/stats").to_request(),
        )
        .await;
        assert_eq!(body["totals"]["total_courses"], 0);
        assert!(body["totals"]["average_overall"].is_null());
        assert_eq!(body["most_reviewed"], serde_json::json!([]));
    }
}
