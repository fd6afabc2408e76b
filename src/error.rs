use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

/// Erreurs fatales pour la requête (stockage, session) => 500
/// Les erreurs de validation ne passent pas par ici : elles sont affichées dans la page
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Session error: {0}")]
    Session(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        error!(error = %self, "request failed");
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
