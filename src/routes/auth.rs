use actix_web::{get, post, web, HttpResponse};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::middleware::{CurrentUser, SessionContext};
use crate::models::dto::SessionUser;
use crate::models::users::{Column as UserColumn, Entity as Users};
use crate::routes::{redirect, FirstValues};
use crate::utils::password;

pub const LOGIN_ERROR: &str = "Invalid username or password.";

// DTO du formulaire de connexion
#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl From<&FirstValues> for LoginForm {
    fn from(values: &FirstValues) -> Self {
        Self {
            username: values.get("username").unwrap_or_default(),
            password: values.get("password").unwrap_or_default(),
        }
    }
}

// Page de connexion
#[derive(Serialize)]
pub struct LoginPage {
    pub current_user: Option<SessionUser>,
    pub error: String,
}

/// GET /login - Formulaire de connexion (PUBLIC)
#[get("/login")]
pub async fn login_page(current_user: CurrentUser) -> HttpResponse {
    if current_user.is_logged_in() {
        return redirect("/");
    }

    HttpResponse::Ok().json(LoginPage {
        current_user: None,
        error: String::new(),
    })
}

/// POST /login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    current_user: CurrentUser,
    session: SessionContext,
    form: web::Form<Vec<(String, String)>>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    if current_user.is_logged_in() {
        return Ok(redirect("/"));
    }

    let form = LoginForm::from(&FirstValues::from(form.into_inner()));

    // 1. Trouver l'utilisateur
    let username = form.username.trim();
    let user = Users::find()
        .filter(UserColumn::Username.eq(username))
        .one(db.get_ref())
        .await?;

    // 2. Vérifier le mot de passe (même message si l'utilisateur n'existe pas)
    let Some(user) = user.filter(|u| password::verify_password(&u.password_hash, &form.password)) else {
        warn!(%username, "failed login attempt");
        return Ok(HttpResponse::Unauthorized().json(LoginPage {
            current_user: None,
            error: LOGIN_ERROR.to_string(),
        }));
    };

    // 3. Ouvrir la session
    session.persist_user(user.id)?;
    session.flash("Welcome back.", "success")?;
    info!(user_id = user.id, username = %user.username, "user logged in");

    Ok(redirect("/"))
}

/// POST /logout - Se déconnecter
#[post("/logout")]
pub async fn logout(session: SessionContext) -> Result<HttpResponse, AppError> {
    session.forget_user();
    session.flash("You have been logged out.", "info")?;
    Ok(redirect("/"))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login_page).service(login).service(logout);
}
