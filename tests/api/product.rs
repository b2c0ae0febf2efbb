use waretrack::models::Product;

use crate::helpers::{create_user_and_login, seed_product, TestApp};

#[actix_web::test]
pub async fn employee_can_check_in_a_product_for_a_customer() {
    let app = TestApp::spawn_app().await;
    let (customer, _customer_client) = create_user_and_login(&app, "customer").await;
    let (_employee, employee_client) = create_user_and_login(&app, "employee").await;

    let warehouse_response = employee_client
        .post(format!("{}/employee/warehouses", app.get_app_url()))
        .form(&serde_json::json!({
            "name": "Marina Bay Sands",
            "address": "10 Bayfront Ave, Singapore 018956"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(warehouse_response.status().as_u16(), 200);
    let warehouse_id = warehouse_response.json::<uuid::Uuid>().await.unwrap();

    let response = employee_client
        .post(format!("{}/employee/check-in", app.get_app_url()))
        .form(&serde_json::json!({
            "customer_id": customer.user_id,
            "warehouse_id": warehouse_id,
            "name": "iPhone 15",
            "quantity": 10,
            "condition": "NEW",
            "memo": "received intact"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[actix_web::test]
pub async fn check_in_with_non_positive_quantity_is_rejected() {
    let app = TestApp::spawn_app().await;
    let (customer, _customer_client) = create_user_and_login(&app, "customer").await;
    let (_employee, employee_client) = create_user_and_login(&app, "employee").await;

    let response = employee_client
        .post(format!("{}/employee/check-in", app.get_app_url()))
        .form(&serde_json::json!({
            "customer_id": customer.user_id,
            "warehouse_id": uuid::Uuid::new_v4(),
            "name": "iPhone 15",
            "quantity": 0,
            "condition": "NEW"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
pub async fn customers_only_see_available_lots() {
    let app = TestApp::spawn_app().await;
    let (customer, customer_client) = create_user_and_login(&app, "customer").await;

    let available = seed_product(&app, customer.user_id, 10);
    let exhausted = seed_product(&app, customer.user_id, 0);

    let response = customer_client
        .get(format!(
            "{}/user/products?page=1&limit=50",
            app.get_app_url()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let products = response.json::<Vec<Product>>().await.unwrap();
    let ids: Vec<_> = products.iter().map(|p| p.product_id).collect();

    assert!(ids.contains(&available.product_id));
    assert!(!ids.contains(&exhausted.product_id));
}

#[actix_web::test]
pub async fn product_lookup_by_upc_works() {
    let app = TestApp::spawn_app().await;
    let (customer, customer_client) = create_user_and_login(&app, "customer").await;
    let product = seed_product(&app, customer.user_id, 5);

    let response = customer_client
        .get(format!(
            "{}/user/products/upc/{}",
            app.get_app_url(),
            product.upc
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let found = response.json::<Product>().await.unwrap();
    assert_eq!(found.product_id, product.product_id);

    let response = customer_client
        .get(format!(
            "{}/user/products/upc/000000000000",
            app.get_app_url()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
