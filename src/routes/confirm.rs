use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db_interaction::{get_user_id_from_confirmation_id, set_user_active},
    utils::{get_pooled_connection, DbPool},
};

// Struct representing query parameter for confirmation endpoint
#[derive(Deserialize, Debug)]
pub struct Confirmation {
    id: Uuid,
}

#[tracing::instrument("Confirm user account", skip(pool))]
pub async fn confirm(
    pool: web::Data<DbPool>,
    form: web::Query<Confirmation>,
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let user_id = get_user_id_from_confirmation_id(form.0.id, conn)
        .await
        .map_err(ErrorInternalServerError)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    set_user_active(user_id, conn)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().body("account confirmed"))
}
