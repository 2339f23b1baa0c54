use diesel::prelude::*;
use dotenvy::dotenv;
use std::env;

pub mod auth;
pub mod commands;
pub mod media;
pub mod models;
pub mod notifications;
pub mod schema;

pub fn establish_connection() -> PgConnection {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgConnection::establish(&database_url).unwrap()
}
