use actix_web::{dev::Payload, error::ErrorInternalServerError, web, Error, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use tracing::debug;

use crate::middleware::session::SessionContext;
use crate::models::dto::SessionUser;
use crate::models::users::Entity as Users;

/// Utilisateur courant résolu depuis la session, ou invité (None)
/// Utilisée comme extracteur dans toutes les routes qui affichent une page
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<SessionUser>);

impl CurrentUser {
    pub fn is_logged_in(&self) -> bool {
        self.0.is_some()
    }
}

/// Associe l'id stocké en session à un utilisateur existant
/// Pas d'id, ou id qui n'existe plus en base => invité, jamais d'erreur
pub async fn resolve_current_user(
    db: &DatabaseConnection,
    user_id: Option<i32>,
) -> Result<Option<SessionUser>, DbErr> {
    let Some(user_id) = user_id else {
        return Ok(None);
    };

    let user = Users::find_by_id(user_id).one(db).await?;
    if user.is_none() {
        debug!(user_id, "session refers to unknown user, treating as guest");
    }

    Ok(user.map(|u| SessionUser {
        id: u.id,
        username: u.username,
    }))
}

/// Implémentation de FromRequest pour CurrentUser
/// Erreur de stockage => 500, tout le reste => invité
impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();

        Box::pin(async move {
            let session = session.await?;
            let db = db.ok_or_else(|| ErrorInternalServerError("Database not configured"))?;
            let user = resolve_current_user(db.get_ref(), session.user_id())
                .await
                .map_err(crate::error::AppError::from)?;
            Ok(CurrentUser(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_database;
    use crate::models::users::ActiveModel as UserActiveModel;
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn test_resolve_current_user() {
        let db = create_test_database().await;
        let user = UserActiveModel {
            username: Set("admin".to_string()),
            password_hash: Set("pbkdf2sha256$1$salt$00".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let resolved = resolve_current_user(&db, Some(user.id)).await.unwrap();
        assert_eq!(
            resolved,
            Some(SessionUser { id: user.id, username: "admin".to_string() })
        );

        assert_eq!(resolve_current_user(&db, None).await.unwrap(), None);
        assert_eq!(resolve_current_user(&db, Some(user.id + 100)).await.unwrap(), None);
    }
}
