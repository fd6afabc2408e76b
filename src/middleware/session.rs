use actix_session::{Session, SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sha2::{Digest, Sha512};
use tracing::warn;

use crate::error::AppError;
use crate::models::dto::Flash;

pub(crate) const USER_ID_KEY: &str = "userid";
const FLASH_KEY: &str = "flash";

/// Wrapper autour de la session Actix : les handlers ne manipulent
/// que des opérations métier (user id, messages flash)
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Enregistre l'utilisateur connecté (nouvelle session pour éviter la fixation)
    pub fn persist_user(&self, user_id: i32) -> Result<(), AppError> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id)
            .map_err(|e| AppError::Session(format!("failed to persist session: {e}")))
    }

    /// Id de l'utilisateur en session ; une valeur illisible compte comme absente
    pub fn user_id(&self) -> Option<i32> {
        match self.0.get::<i32>(USER_ID_KEY) {
            Ok(id) => id,
            Err(e) => {
                warn!("invalid user id in session cookie: {e}");
                None
            }
        }
    }

    pub fn forget_user(&self) {
        self.0.remove(USER_ID_KEY);
    }

    pub fn flash(&self, message: &str, category: &str) -> Result<(), AppError> {
        self.0
            .insert(FLASH_KEY, (message, category))
            .map_err(|e| AppError::Session(format!("failed to store flash message: {e}")))
    }

    /// Récupère et consomme le message flash en attente
    pub fn take_flash(&self) -> Option<Flash> {
        match self.0.remove_as::<(String, String)>(FLASH_KEY)? {
            Ok((message, category)) => Some(Flash { message, category }),
            Err(raw) => {
                warn!(%raw, "discarding unreadable flash message");
                None
            }
        }
    }
}

/// Clé de signature des cookies dérivée du secret (SHA-512 => 64 octets)
/// Un secret court reste utilisable, contrairement à Key::derive_from
pub fn session_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

pub fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
