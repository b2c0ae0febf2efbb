use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use waretrack::schema::users;

use crate::helpers::TestApp;

#[actix_web::test]
pub async fn registration_sends_confirmation_email_and_confirm_activates() {
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

    let mut conn = app.pool.get().unwrap();
    let (is_active, role) = users::table
        .filter(users::email.eq("jamie@example.com"))
        .select((users::is_active, users::role))
        .get_result::<(bool, String)>(&mut conn)
        .unwrap();
    assert!(!is_active);
    assert_eq!(role, "customer");

    let confirmation_link = app.latest_confirmation_link().await;
    let response = app
        .api_client
        .get(confirmation_link)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let is_active = users::table
        .filter(users::email.eq("jamie@example.com"))
        .select(users::is_active)
        .get_result::<bool>(&mut conn)
        .unwrap();
    assert!(is_active);
}

#[actix_web::test]
pub async fn registration_with_mismatched_passwords_is_rejected() {
    let app = TestApp::spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/register", app.get_app_url()))
        .form(&serde_json::json!({
            "email": "jamie@example.com",
            "name": "Jamie Customer",
            "password": "secret-password",
            "confirm_password": "different-password"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
pub async fn duplicate_email_registration_is_rejected() {
    let app = TestApp::spawn_app().await;

    let form = serde_json::json!({
        "email": "jamie@example.com",
        "name": "Jamie Customer",
        "password": "secret-password",
        "confirm_password": "secret-password"
    });

    let response = app
        .api_client
        .post(format!("{}/register", app.get_app_url()))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .api_client
        .post(format!("{}/register", app.get_app_url()))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
