use actix_web::{
    error::{ErrorBadRequest, ErrorInternalServerError, ErrorUnauthorized},
    web, HttpResponse,
};
use anyhow::Context;
use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    db_interaction::get_user_from_email,
    domain::user_email::UserEmail,
    password::verify_password,
    session_state::TypedSession,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

#[tracing::instrument("Logging in user", skip(form, pool, session))]
pub async fn login(
    pool: web::Data<DbPool>,
    form: web::Form<LoginForm>,
    session: TypedSession,
) -> Result<HttpResponse, actix_web::Error> {
    let email = UserEmail::parse(form.0.email).map_err(ErrorBadRequest)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let user_info = match get_user_from_email(conn, email.inner())
        .await
        .map_err(ErrorInternalServerError)?
    {
        Ok(user) => user,
        Err(e) => {
            tracing::info!("{:?}", e);
            return Err(ErrorBadRequest(anyhow::anyhow!(
                "No user registered with this email"
            )));
        }
    };

    if !user_info.is_active {
        return Err(ErrorUnauthorized("Account is not confirmed yet"));
    }

    match verify_password(form.0.password, user_info.password.clone()).await {
        Ok(res) => {
            if res {
                session.renew();
                session
                    .insert("user_id", &user_info.user_id.to_string())
                    .context("Failed to insert associated user_id to session")
                    .map_err(ErrorInternalServerError)?;

                session
                    .insert("role", &user_info.role)
                    .context("Failed to insert user role to the session")
                    .map_err(ErrorInternalServerError)?;
            } else {
                tracing::info!("Passwords did not match");
                return Err(ErrorUnauthorized("Email or password is incorrect"));
            }
        }
        Err(e) => {
            let err = e.to_string();
            tracing::error!(err);
            return Err(ErrorInternalServerError("Failed to login"));
        }
    }

    Ok(HttpResponse::Ok().body("Successfully logged in"))
}
