use crate::helpers::{create_user_and_login, TestApp};

#[actix_web::test]
pub async fn unconfirmed_user_cannot_login() {
    let app = TestApp::spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/register", app.get_app_url()))
        .form(&serde_json::json!({
            "email": "jamie@example.com",
            "name": "Jamie Customer",
            "password": "secret-password",
            "confirm_password": "secret-password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .api_client
        .post(format!("{}/login", app.get_app_url()))
        .form(&serde_json::json!({
            "email": "jamie@example.com",
            "password": "secret-password"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
pub async fn login_with_wrong_password_is_rejected() {
    let app = TestApp::spawn_app().await;
    let (user, _client) = create_user_and_login(&app, "customer").await;

    let response = app
        .api_client
        .post(format!("{}/login", app.get_app_url()))
        .form(&serde_json::json!({
            "email": user.email,
            "password": "not-the-password"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
pub async fn protected_routes_reject_anonymous_users() {
    let app = TestApp::spawn_app().await;

    let response = app
        .api_client
        .get(format!("{}/user/profile", app.get_app_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
}

#[actix_web::test]
pub async fn logout_clears_the_session() {
    let app = TestApp::spawn_app().await;
    let (_user, client) = create_user_and_login(&app, "customer").await;

    let response = client
        .get(format!("{}/user/profile", app.get_app_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .post(format!("{}/user/logout", app.get_app_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .get(format!("{}/user/profile", app.get_app_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[actix_web::test]
pub async fn customer_cannot_reach_employee_scope() {
    let app = TestApp::spawn_app().await;
    let (_user, client) = create_user_and_login(&app, "customer").await;

    let response = client
        .post(format!("{}/employee/warehouses", app.get_app_url()))
        .form(&serde_json::json!({
            "name": "Annex",
            "address": "2 Dockside Rd"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
}
