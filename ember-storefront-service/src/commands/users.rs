use argon2::password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHash};
use chrono::Utc;
use diesel::{insert_into, prelude::*, PgConnection};
use uuid::Uuid;

use super::{normalize_email, CommandError};
use crate::models::{
    AdminUserChanges, CredentialType, ProfileChanges, User, UserCredentials, UserRole,
};
use crate::schema;

pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub photo_url: Option<String>,
    pub password: String,
}

pub fn validate_registration(reg: &Registration) -> Result<Registration, CommandError> {
    let trimmed = Registration {
        first_name: reg.first_name.trim().to_string(),
        last_name: reg.last_name.trim().to_string(),
        email: normalize_email(&reg.email),
        phone: reg.phone.trim().to_string(),
        address: reg.address.trim().to_string(),
        photo_url: reg.photo_url.clone(),
        password: reg.password.clone(),
    };
    if trimmed.first_name.is_empty()
        || trimmed.last_name.is_empty()
        || trimmed.phone.is_empty()
        || trimmed.address.is_empty()
    {
        return Err(CommandError::Validation(
            "All fields are required".to_string(),
        ));
    }
    if !ember_mailer_api::is_valid_email(&trimmed.email) {
        return Err(CommandError::Validation(
            "A valid email is required".to_string(),
        ));
    }
    if trimmed.password.len() < 6 {
        return Err(CommandError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(trimmed)
}

pub fn register(conn: &mut PgConnection, reg: &Registration) -> Result<User, CommandError> {
    insert_with_role(conn, reg, UserRole::Customer)
}

/// Back-office account insert; identical to self-registration except the
/// caller picks the role.
pub fn admin_insert(
    conn: &mut PgConnection,
    reg: &Registration,
    role: UserRole,
) -> Result<User, CommandError> {
    insert_with_role(conn, reg, role)
}

fn insert_with_role(
    conn: &mut PgConnection,
    reg: &Registration,
    role: UserRole,
) -> Result<User, CommandError> {
    let reg = validate_registration(reg)?;

    let existing = schema::users::table
        .filter(schema::users::email.eq(&reg.email))
        .select(User::as_select())
        .first::<User>(conn)
        .optional()?;
    if existing.is_some() {
        return Err(CommandError::Conflict(
            "Email already registered".to_string(),
        ));
    }

    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);
    let user = User {
        id: Uuid::new_v4(),
        first_name: reg.first_name,
        last_name: reg.last_name,
        email: reg.email,
        phone: reg.phone,
        address: reg.address,
        photo_url: reg.photo_url,
        role,
        created_at: Utc::now(),
    };
    let user_credential = UserCredentials {
        user_id: user.id,
        credential_type: CredentialType::Passphrase,
        sub: argon2
            .hash_password(reg.password.as_bytes(), &salt)
            .map_err(CommandError::Hash)?
            .to_string(),
    };

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        insert_into(schema::users::table)
            .values(&user)
            .execute(conn)?;
        insert_into(schema::user_credentials::table)
            .values(&user_credential)
            .execute(conn)?;
        Ok(())
    })?;

    Ok(user)
}

/// `Ok(None)` covers both an unknown email and a wrong password.
pub fn verify_credentials(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
) -> Result<Option<User>, CommandError> {
    let email = normalize_email(email);
    let Some(user) = schema::users::table
        .filter(schema::users::email.eq(&email))
        .select(User::as_select())
        .first::<User>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let argon2 = Argon2::default();
    let credentials = UserCredentials::belonging_to(&user)
        .filter(schema::user_credentials::credential_type.eq(CredentialType::Passphrase))
        .select(UserCredentials::as_select())
        .load::<UserCredentials>(conn)?;
    let verified = credentials
        .iter()
        .filter_map(|c| PasswordHash::new(&c.sub).ok())
        .any(|hash| argon2.verify_password(password.as_bytes(), &hash).is_ok());

    Ok(verified.then_some(user))
}

pub fn get(conn: &mut PgConnection, user_id: &Uuid) -> Result<User, CommandError> {
    schema::users::table
        .find(user_id)
        .select(User::as_select())
        .first::<User>(conn)
        .optional()?
        .ok_or(CommandError::NotFound("User"))
}

pub fn update_profile(
    conn: &mut PgConnection,
    user_id: &Uuid,
    changes: &ProfileChanges,
) -> Result<User, CommandError> {
    let changes = ProfileChanges {
        first_name: changes.first_name.trim().to_string(),
        last_name: changes.last_name.trim().to_string(),
        phone: changes.phone.trim().to_string(),
        address: changes.address.trim().to_string(),
    };
    if changes.first_name.is_empty()
        || changes.last_name.is_empty()
        || changes.phone.is_empty()
        || changes.address.is_empty()
    {
        return Err(CommandError::Validation(
            "All fields are required".to_string(),
        ));
    }

    diesel::update(schema::users::table.find(user_id))
        .set(changes)
        .returning(User::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(CommandError::NotFound("User"))
}

pub fn set_photo_url(
    conn: &mut PgConnection,
    user_id: &Uuid,
    photo_url: &str,
) -> Result<User, CommandError> {
    diesel::update(schema::users::table.find(user_id))
        .set(schema::users::photo_url.eq(photo_url))
        .returning(User::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(CommandError::NotFound("User"))
}

/// Orders, reviews, cart lines and credentials of the user are removed with
/// the row by the schema's cascade rules.
pub fn delete(conn: &mut PgConnection, user_id: &Uuid) -> Result<(), CommandError> {
    let deleted = diesel::delete(schema::users::table.find(user_id)).execute(conn)?;
    if deleted == 0 {
        return Err(CommandError::NotFound("User"));
    }
    Ok(())
}

pub fn list_all(conn: &mut PgConnection) -> Result<Vec<User>, CommandError> {
    let users = schema::users::table
        .order(schema::users::created_at.desc())
        .select(User::as_select())
        .load::<User>(conn)?;
    Ok(users)
}

pub fn admin_update(
    conn: &mut PgConnection,
    user_id: &Uuid,
    changes: &AdminUserChanges,
) -> Result<User, CommandError> {
    let changes = AdminUserChanges {
        first_name: changes.first_name.trim().to_string(),
        last_name: changes.last_name.trim().to_string(),
        phone: changes.phone.trim().to_string(),
        address: changes.address.trim().to_string(),
        role: changes.role,
    };
    if changes.first_name.is_empty()
        || changes.last_name.is_empty()
        || changes.phone.is_empty()
        || changes.address.is_empty()
    {
        return Err(CommandError::Validation(
            "All fields are required".to_string(),
        ));
    }

    diesel::update(schema::users::table.find(user_id))
        .set(changes)
        .returning(User::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(CommandError::NotFound("User"))
}
