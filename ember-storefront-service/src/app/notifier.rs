use std::env;
use std::time::Duration;

use diesel::result::Error as DieselError;
use diesel::{
    Connection, ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper,
};
use dotenvy::dotenv;
use reqwest::StatusCode;
use tracing::{error, info};

use ember_storefront_service::models::{MailKind, MailOutbox};
use ember_storefront_service::{establish_connection, schema};

struct OutboxProcessor {
    http: reqwest::Client,
    endpoint: String,
}

impl OutboxProcessor {
    /// Claims the oldest queued mail and bumps its attempt counter. The row
    /// itself stays queued until the relay has accepted it, so a crash
    /// between send and delete re-delivers rather than drops.
    fn claim_next(
        &self,
        conn: &mut PgConnection,
    ) -> Result<Option<MailOutbox>, OutboxProcessingError> {
        use schema::mail_outbox::dsl::*;

        conn.transaction::<_, OutboxProcessingError, _>(|conn| {
            let row = match mail_outbox
                .select(MailOutbox::as_select())
                .order(schema::mail_outbox::id.asc())
                .for_update()
                .skip_locked()
                .first::<MailOutbox>(conn)
            {
                Ok(row) => row,
                Err(DieselError::NotFound) => return Ok(None),
                Err(err) => return Err(OutboxProcessingError::Database(err)),
            };

            diesel::update(mail_outbox.filter(schema::mail_outbox::id.eq(row.id)))
                .set(attempts.eq(row.attempts + 1))
                .execute(conn)
                .map_err(OutboxProcessingError::Database)?;

            Ok(Some(row))
        })
    }

    async fn send_message(&self, row: &MailOutbox) -> Result<(), OutboxProcessingError> {
        let path = match row.kind {
            MailKind::NewsletterWelcome => "/api/send-newsletter",
            MailKind::OrderConfirmation => "/api/send-confirmation",
        };

        let response = self
            .http
            .post(format!("{}{}", self.endpoint, path))
            .json(&row.payload)
            .send()
            .await
            .map_err(OutboxProcessingError::Relay)?;
        if !response.status().is_success() {
            return Err(OutboxProcessingError::Rejected(response.status()));
        }
        Ok(())
    }

    fn delete_row(
        &self,
        conn: &mut PgConnection,
        row: &MailOutbox,
    ) -> Result<(), OutboxProcessingError> {
        use schema::mail_outbox::dsl::*;

        diesel::delete(mail_outbox.filter(schema::mail_outbox::id.eq(row.id))).execute(conn)?;
        Ok(())
    }

    async fn process_next_outbox_row(
        &self,
        conn: &mut PgConnection,
    ) -> Result<bool, OutboxProcessingError> {
        let Some(row) = self.claim_next(conn)? else {
            return Ok(false);
        };
        self.send_message(&row).await?;
        self.delete_row(conn, &row)?;
        Ok(true)
    }
}

pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let endpoint = env::var("MAILER_ENDPOINT").expect("MAILER_ENDPOINT must be set");

    let conn = &mut establish_connection();
    let processor = OutboxProcessor {
        http: reqwest::Client::new(),
        endpoint,
    };

    info!("Mail outbox processor started");

    loop {
        let result = processor.process_next_outbox_row(conn).await;

        match result {
            Ok(true) => {}
            Ok(false) => {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(err) => {
                error!(error = ?err, "Error processing outbox row");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

#[derive(Debug)]
pub enum OutboxProcessingError {
    Database(DieselError),
    Relay(reqwest::Error),
    Rejected(StatusCode),
}

impl From<DieselError> for OutboxProcessingError {
    fn from(err: DieselError) -> Self {
        OutboxProcessingError::Database(err)
    }
}
