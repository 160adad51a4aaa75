use std::{env::var, sync::Arc};

use dotenv::dotenv;
use eyre::{Context, Error};
use log::info;

#[derive(Clone)]
pub struct Env(Arc<EnvInner>);

struct EnvInner {
    mongo_url: String,
    db_name: Option<String>,
}

impl Env {
    pub fn mongo_url(&self) -> &str {
        &self.0.mongo_url
    }

    pub fn db_name(&self) -> Option<&str> {
        self.0.db_name.as_deref()
    }

    pub fn load() -> Result<Env, Error> {
        if let Err(err) = dotenv() {
            info!("Failed to load .env file: {}", err);
        }

        Ok(Env(Arc::new(EnvInner {
            mongo_url: var("MONGO_URL").context("MONGO_URL is not set")?,
            db_name: var("ATTENDANCE_DB").ok(),
        })))
    }
}
