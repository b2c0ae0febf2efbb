use actix_session::SessionExt;
use actix_web::{error::ErrorForbidden, error::ErrorUnauthorized, FromRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::models::UserRole;
use crate::session_state::TypedSession;

// Extractor for the employee capability
pub struct IsEmployee(pub Uuid);

// Extractor for any authenticated user; second field carries the role
#[derive(Debug)]
pub struct IsUser(pub Uuid, pub UserRole);

fn session_identity(req: &actix_web::HttpRequest) -> Result<(Uuid, UserRole), actix_web::Error> {
    let session = TypedSession(req.get_session());

    let user_id = session
        .get("user_id")
        .unwrap_or(None)
        .ok_or_else(|| ErrorUnauthorized("Not logged in"))?;
    let user_id =
        Uuid::parse_str(&user_id).map_err(|_| ErrorUnauthorized("Malformed session identity"))?;

    let role = session
        .get("role")
        .unwrap_or(None)
        .ok_or_else(|| ErrorUnauthorized("Not logged in"))?;
    let role =
        UserRole::parse(&role).map_err(|_| ErrorUnauthorized("Malformed session identity"))?;

    Ok((user_id, role))
}

impl FromRequest for IsEmployee {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        ready(session_identity(req).and_then(|(user_id, role)| match role {
            UserRole::Employee => Ok(IsEmployee(user_id)),
            UserRole::Customer => Err(ErrorForbidden("Unauthorized Role")),
        }))
    }
}

impl FromRequest for IsUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        ready(session_identity(req).map(|(user_id, role)| IsUser(user_id, role)))
    }
}
