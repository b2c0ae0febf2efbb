use std::net::TcpListener;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, dev::Server, web, App, HttpServer};
use anyhow::Context;
use diesel::{r2d2::ConnectionManager, PgConnection};
use r2d2::Pool;
use secrecy::ExposeSecret;
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::Settings,
    domain::user_email::UserEmail,
    email_client::EmailClient,
    employee_middleware::EmployeeMiddlewareFactory,
    ocr_client::OcrClient,
    routes::{
        authentication::{login, logout, register},
        confirm, health_check,
        product::{check_in_product, get_product_list, get_product_upc},
        profile::{get_profile, post_profile},
        request::{get_request_list, post_approve_request, post_cancel_request, post_request},
        warehouse::{get_warehouse_list, post_warehouse},
    },
    session_state::SessionMiddlewareFactory,
    utils::DbPool,
};

// Base url used to build links embedded in outgoing emails
pub struct BaseUrl(pub String);

pub struct Application {
    pub host: String,
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn new(settings: Settings) -> Result<Application, anyhow::Error> {
        let pool: DbPool = Pool::builder()
            .build(ConnectionManager::<PgConnection>::new(
                settings.database.get_database_table_url(),
            ))
            .context("Failed to build connection pool")?;

        let sender = UserEmail::parse(settings.email.sender.clone())
            .map_err(|e| anyhow::anyhow!("Invalid sender email: {}", e))?;
        let email_client = EmailClient::new(
            settings.email.api_uri.clone(),
            sender,
            settings.email.authorization_token.clone(),
            settings.email.timeout_seconds,
        );

        let ocr_client = OcrClient::new(
            settings.ocr.api_uri.clone(),
            settings.ocr.api_key.clone(),
            settings.ocr.timeout_seconds,
        );

        let listener = TcpListener::bind((
            settings.application.host.as_str(),
            settings.application.port,
        ))
        .context("Failed to bind application port")?;
        let port = listener.local_addr()?.port();
        let host = settings.application.host.clone();

        let session_key =
            Key::derive_from(settings.application.hmac_secret.expose_secret().as_bytes());

        let pool = web::Data::new(pool);
        let email_client = web::Data::new(email_client);
        let ocr_client = web::Data::new(ocr_client);
        let base_url = web::Data::new(BaseUrl(settings.application.base_url.clone()));

        let server = HttpServer::new(move || {
            App::new()
                .wrap(TracingLogger::default())
                .wrap(
                    SessionMiddleware::builder(
                        CookieSessionStore::default(),
                        session_key.clone(),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .route("/health", web::get().to(health_check))
                .route("/register", web::post().to(register))
                .route("/login", web::post().to(login))
                .route("/confirm", web::get().to(confirm))
                .service(
                    web::scope("/user")
                        .wrap(SessionMiddlewareFactory)
                        .route("/logout", web::post().to(logout))
                        .route("/profile", web::get().to(get_profile))
                        .route("/profile", web::post().to(post_profile))
                        .route("/products", web::get().to(get_product_list))
                        .route("/products/upc/{upc}", web::get().to(get_product_upc))
                        .route("/warehouses", web::get().to(get_warehouse_list))
                        .route("/requests", web::get().to(get_request_list))
                        .route("/requests", web::post().to(post_request))
                        .route("/requests/cancel", web::post().to(post_cancel_request)),
                )
                .service(
                    web::scope("/employee")
                        .wrap(EmployeeMiddlewareFactory)
                        .route("/warehouses", web::post().to(post_warehouse))
                        .route("/check-in", web::post().to(check_in_product))
                        .route("/requests/approve", web::post().to(post_approve_request)),
                )
                .app_data(pool.clone())
                .app_data(email_client.clone())
                .app_data(ocr_client.clone())
                .app_data(base_url.clone())
        })
        .listen(listener)?
        .run();

        Ok(Application { host, port, server })
    }
}
