use actix_web::{get, HttpResponse};

/// Sonde de disponibilité pour l'hébergeur
#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}
