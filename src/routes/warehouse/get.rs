use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use serde::Deserialize;

use crate::{
    auth::extractors::IsUser,
    db_interaction::get_warehouses,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct GetWarehousesQuery {
    page: i64,
    limit: i64,
}

#[tracing::instrument("Get warehouse entries", skip(pool))]
pub async fn get_warehouse_list(
    pool: web::Data<DbPool>,
    query: web::Query<GetWarehousesQuery>,
    _: IsUser,
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let warehouses = get_warehouses(conn, query.0.page, query.0.limit)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(warehouses))
}
