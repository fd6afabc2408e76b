pub mod auth;
pub mod courses;
pub mod health;
pub mod stats;

use actix_web::{http::header, web, HttpResponse};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_check)
        .configure(auth::auth_routes)
        .configure(courses::courses_routes)
        .service(stats::stats_page)
        .default_service(web::route().to(not_found));
}

/// 302 vers `location` (post/redirect/get)
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Paires clé/valeur d'une query string ou d'un formulaire urlencoded.
/// Une clé répétée garde sa première valeur au lieu de faire échouer l'extraction.
#[derive(Debug, Default)]
pub struct FirstValues(Vec<(String, String)>);

impl FirstValues {
    pub fn get(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

impl From<Vec<(String, String)>> for FirstValues {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Not found"
    }))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_database;
    use crate::middleware::session::test_utils::test_session_middleware;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_unknown_route_is_404_json() {
        let db = create_test_database().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .wrap(test_session_middleware())
                .configure(configure_routes),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Not found");
    }

    #[actix_web::test]
    async fn test_first_value_wins() {
        let values = FirstValues::from(vec![
            ("level".to_string(), "300".to_string()),
            ("level".to_string(), "200".to_string()),
        ]);
        assert_eq!(values.get("level").as_deref(), Some("300"));
        assert_eq!(values.get("search"), None);
    }

    #[actix_web::test]
    async fn test_redirect_sets_location() {
        let res = redirect("/course/3?saved=1");
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/course/3?saved=1");
    }
}
