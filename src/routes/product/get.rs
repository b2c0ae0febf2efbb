use actix_web::{
    error::{ErrorInternalServerError, ErrorNotFound},
    web, HttpResponse,
};
use serde::Deserialize;

use crate::{
    auth::extractors::IsUser,
    db_interaction::{get_product_by_upc, get_products},
    models::UserRole,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct GetProductsQuery {
    page: i64,
    limit: i64,
}

// Customers browse lots they can still reserve from; employees see all lots
#[tracing::instrument("Get product entries", skip(pool, uid))]
pub async fn get_product_list(
    pool: web::Data<DbPool>,
    query: web::Query<GetProductsQuery>,
    uid: IsUser,
) -> Result<HttpResponse, actix_web::Error> {
    let available_only = uid.1 == UserRole::Customer;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let products = get_products(conn, query.0.page, query.0.limit, available_only)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(products))
}

#[tracing::instrument("Get product by UPC", skip(pool))]
pub async fn get_product_upc(
    pool: web::Data<DbPool>,
    upc: web::Path<String>,
    _: IsUser,
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let product = get_product_by_upc(conn, upc.into_inner())
        .await
        .map_err(ErrorInternalServerError)?
        .ok_or_else(|| ErrorNotFound("No product with this UPC"))?;

    Ok(HttpResponse::Ok().json(product))
}
