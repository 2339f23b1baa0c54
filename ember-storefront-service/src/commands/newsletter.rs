use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{prelude::*, PgConnection};

use super::{normalize_email, CommandError};
use crate::models::NewsletterSubscriber;
use crate::notifications::MailPublisher;
use crate::schema;

pub fn normalize_and_validate(email: &str) -> Result<String, CommandError> {
    let email = normalize_email(email);
    if !ember_mailer_api::is_valid_email(&email) {
        return Err(CommandError::Validation(
            "A valid email is required".to_string(),
        ));
    }
    Ok(email)
}

/// Subscribes an address and queues the welcome mail. The insert and the
/// queued mail share one transaction; a duplicate address trips the primary
/// key, rolls back, and so never produces a second welcome mail.
pub fn subscribe(
    conn: &mut PgConnection,
    email: &str,
) -> Result<NewsletterSubscriber, CommandError> {
    let email = normalize_and_validate(email)?;

    let subscriber = NewsletterSubscriber {
        email: email.clone(),
        created_at: Utc::now(),
    };

    conn.transaction(|conn| {
        match diesel::insert_into(schema::newsletter_subscribers::table)
            .values(&subscriber)
            .execute(conn)
        {
            Ok(_) => {}
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                return Err(CommandError::Conflict("Already subscribed".to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        let mut publisher = MailPublisher::new(conn);
        publisher.newsletter_welcome(&email)?;
        Ok(())
    })?;

    Ok(subscriber)
}
