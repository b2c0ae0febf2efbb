use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use serde::Deserialize;

use crate::{
    auth::extractors::IsUser,
    db_interaction::get_requests,
    models::UserRole,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct GetRequestsQuery {
    page: i64,
    limit: i64,
}

// Request history: employees audit everything, customers see their own
#[tracing::instrument("Listing checkout requests", skip(pool, uid))]
pub async fn get_request_list(
    pool: web::Data<DbPool>,
    query: web::Query<GetRequestsQuery>,
    uid: IsUser,
) -> Result<HttpResponse, actix_web::Error> {
    let IsUser(requester_id, role) = uid;
    let is_employee = role == UserRole::Employee;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let requests = get_requests(conn, requester_id, is_employee, query.0.page, query.0.limit)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(requests))
}
