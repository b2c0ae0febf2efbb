use config::{Config, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub email: EmailSettings,
    pub ocr: OcrSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub hmac_secret: SecretString,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: SecretString,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Deserialize, Clone)]
pub struct EmailSettings {
    pub api_uri: String,
    pub sender: String,
    pub authorization_token: SecretString,
    pub timeout_seconds: u64,
}

#[derive(Deserialize, Clone)]
pub struct OcrSettings {
    pub api_uri: String,
    pub api_key: SecretString,
    pub timeout_seconds: u64,
}

impl Settings {
    pub fn get() -> Self {
        Config::builder()
            .add_source(File::with_name("configuration/base.yaml"))
            .build()
            .expect("Failed to get configuration")
            .try_deserialize::<Settings>()
            .expect("Failed to deserialize to Settings struct")
    }
}

impl DatabaseSettings {
    // Connection string to the postgres instance, without a database name
    pub fn get_database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port
        )
    }

    // Connection string to the configured database
    pub fn get_database_table_url(&self) -> String {
        format!("{}/{}", self.get_database_url(), self.name)
    }
}
