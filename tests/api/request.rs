use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use uuid::Uuid;
use waretrack::schema::checkout_requests;

use crate::helpers::{
    checkout_form, create_user_and_login, mount_ocr_failure, mount_ocr_with_text,
    product_quantity, seed_product, TestApp,
};

fn request_row(app: &TestApp, request_id: Uuid) -> (String, String) {
    let mut conn = app.pool.get().unwrap();
    checkout_requests::table
        .filter(checkout_requests::request_id.eq(request_id))
        .select((checkout_requests::status, checkout_requests::tracking_id))
        .get_result::<(String, String)>(&mut conn)
        .unwrap()
}

#[actix_web::test]
pub async fn creating_a_request_reserves_stock_and_stores_extracted_tracking_id() {
    let app = TestApp::spawn_app().await;
    mount_ocr_with_text(&app, "UPS GROUND\nTRK# XY998877").await;

    let (customer, client) = create_user_and_login(&app, "customer").await;
    let product = seed_product(&app, customer.user_id, 10);

    let response = client
        .post(format!("{}/user/requests", app.get_app_url()))
        .multipart(checkout_form(product.product_id, 3))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let request_id = response.json::<Uuid>().await.unwrap();

    assert_eq!(product_quantity(&app, product.product_id), 7);

    let (status, tracking_id) = request_row(&app, request_id);
    assert_eq!(status, "PENDING");
    assert_eq!(tracking_id, "XY998877");
}

#[actix_web::test]
pub async fn request_exceeding_availability_is_rejected_without_state_change() {
    let app = TestApp::spawn_app().await;
    mount_ocr_failure(&app).await;

    let (customer, client) = create_user_and_login(&app, "customer").await;
    let product = seed_product(&app, customer.user_id, 10);

    let response = client
        .post(format!("{}/user/requests", app.get_app_url()))
        .multipart(checkout_form(product.product_id, 11))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    assert_eq!(product_quantity(&app, product.product_id), 10);

    let mut conn = app.pool.get().unwrap();
    let request_count: i64 = checkout_requests::table
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(request_count, 0);
}

#[actix_web::test]
pub async fn request_for_unknown_product_returns_404() {
    let app = TestApp::spawn_app().await;
    mount_ocr_failure(&app).await;

    let (_customer, client) = create_user_and_login(&app, "customer").await;

    let response = client
        .post(format!("{}/user/requests", app.get_app_url()))
        .multipart(checkout_form(Uuid::new_v4(), 1))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
pub async fn ocr_failure_falls_back_to_synthetic_tracking_id() {
    let app = TestApp::spawn_app().await;
    mount_ocr_failure(&app).await;

    let (customer, client) = create_user_and_login(&app, "customer").await;
    let product = seed_product(&app, customer.user_id, 10);

    let response = client
        .post(format!("{}/user/requests", app.get_app_url()))
        .multipart(checkout_form(product.product_id, 2))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let request_id = response.json::<Uuid>().await.unwrap();

    let (_status, tracking_id) = request_row(&app, request_id);
    assert_eq!(tracking_id.len(), 18);
    assert!(tracking_id.starts_with("1Z"));
    assert!(tracking_id[2..]
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[actix_web::test]
pub async fn approving_a_pending_request_transitions_it_exactly_once() {
    let app = TestApp::spawn_app().await;
    mount_ocr_failure(&app).await;

    let (customer, customer_client) = create_user_and_login(&app, "customer").await;
    let (_employee, employee_client) = create_user_and_login(&app, "employee").await;
    let product = seed_product(&app, customer.user_id, 10);

    let response = customer_client
        .post(format!("{}/user/requests", app.get_app_url()))
        .multipart(checkout_form(product.product_id, 3))
        .send()
        .await
        .unwrap();
    let request_id = response.json::<Uuid>().await.unwrap();

    let response = employee_client
        .post(format!("{}/employee/requests/approve", app.get_app_url()))
        .form(&serde_json::json!({"request_id": request_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let (status, _tracking_id) = request_row(&app, request_id);
    assert_eq!(status, "CHECKED_OUT");
    // approval must not move the ledger
    assert_eq!(product_quantity(&app, product.product_id), 7);

    let response = employee_client
        .post(format!("{}/employee/requests/approve", app.get_app_url()))
        .form(&serde_json::json!({"request_id": request_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
pub async fn approving_an_unknown_request_returns_404() {
    let app = TestApp::spawn_app().await;
    let (_employee, employee_client) = create_user_and_login(&app, "employee").await;

    let response = employee_client
        .post(format!("{}/employee/requests/approve", app.get_app_url()))
        .form(&serde_json::json!({"request_id": Uuid::new_v4()}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
pub async fn cancelling_a_pending_request_restores_availability() {
    let app = TestApp::spawn_app().await;
    mount_ocr_failure(&app).await;

    let (customer, client) = create_user_and_login(&app, "customer").await;
    let product = seed_product(&app, customer.user_id, 10);

    let response = client
        .post(format!("{}/user/requests", app.get_app_url()))
        .multipart(checkout_form(product.product_id, 4))
        .send()
        .await
        .unwrap();
    let request_id = response.json::<Uuid>().await.unwrap();
    assert_eq!(product_quantity(&app, product.product_id), 6);

    let response = client
        .post(format!("{}/user/requests/cancel", app.get_app_url()))
        .form(&serde_json::json!({"request_id": request_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let (status, _tracking_id) = request_row(&app, request_id);
    assert_eq!(status, "CANCELLED");
    assert_eq!(product_quantity(&app, product.product_id), 10);

    // cancelled is terminal; a second cancel must not release units again
    let response = client
        .post(format!("{}/user/requests/cancel", app.get_app_url()))
        .form(&serde_json::json!({"request_id": request_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
    assert_eq!(product_quantity(&app, product.product_id), 10);
}

#[actix_web::test]
pub async fn fulfilled_requests_cannot_be_cancelled() {
    let app = TestApp::spawn_app().await;
    mount_ocr_failure(&app).await;

    let (customer, customer_client) = create_user_and_login(&app, "customer").await;
    let (_employee, employee_client) = create_user_and_login(&app, "employee").await;
    let product = seed_product(&app, customer.user_id, 10);

    let response = customer_client
        .post(format!("{}/user/requests", app.get_app_url()))
        .multipart(checkout_form(product.product_id, 3))
        .send()
        .await
        .unwrap();
    let request_id = response.json::<Uuid>().await.unwrap();

    let response = employee_client
        .post(format!("{}/employee/requests/approve", app.get_app_url()))
        .form(&serde_json::json!({"request_id": request_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = customer_client
        .post(format!("{}/user/requests/cancel", app.get_app_url()))
        .form(&serde_json::json!({"request_id": request_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    let (status, _tracking_id) = request_row(&app, request_id);
    assert_eq!(status, "CHECKED_OUT");
    assert_eq!(product_quantity(&app, product.product_id), 7);
}

#[actix_web::test]
pub async fn end_to_end_checkout_scenario() {
    let app = TestApp::spawn_app().await;
    mount_ocr_failure(&app).await;

    let (customer, customer_client) = create_user_and_login(&app, "customer").await;
    let (_employee, employee_client) = create_user_and_login(&app, "employee").await;
    let (_second, second_client) = create_user_and_login(&app, "customer").await;
    let product = seed_product(&app, customer.user_id, 10);

    // first customer reserves 3 of 10
    let response = customer_client
        .post(format!("{}/user/requests", app.get_app_url()))
        .multipart(checkout_form(product.product_id, 3))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let request_id = response.json::<Uuid>().await.unwrap();
    assert_eq!(product_quantity(&app, product.product_id), 7);

    // approval fulfils without touching availability
    let response = employee_client
        .post(format!("{}/employee/requests/approve", app.get_app_url()))
        .form(&serde_json::json!({"request_id": request_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(product_quantity(&app, product.product_id), 7);

    // a second request for 8 units exceeds the remaining 7
    let response = second_client
        .post(format!("{}/user/requests", app.get_app_url()))
        .multipart(checkout_form(product.product_id, 8))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(product_quantity(&app, product.product_id), 7);
}

#[actix_web::test]
pub async fn customers_only_see_their_own_requests() {
    let app = TestApp::spawn_app().await;
    mount_ocr_failure(&app).await;

    let (customer, customer_client) = create_user_and_login(&app, "customer").await;
    let (_other, other_client) = create_user_and_login(&app, "customer").await;
    let (_employee, employee_client) = create_user_and_login(&app, "employee").await;
    let product = seed_product(&app, customer.user_id, 10);

    let response = customer_client
        .post(format!("{}/user/requests", app.get_app_url()))
        .multipart(checkout_form(product.product_id, 1))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let list = |client: &reqwest::Client| {
        client
            .get(format!("{}/user/requests?page=1&limit=50", app.get_app_url()))
            .send()
    };

    let own = list(&customer_client)
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();
    assert_eq!(own.len(), 1);

    let others = list(&other_client)
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();
    assert_eq!(others.len(), 0);

    let all = list(&employee_client)
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}
