use std::io::Write;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
};
use serde_json::Value;
use uuid::Uuid;

use crate::schema::{
    carts, dishes, mail_outbox, newsletter_subscribers, order_items, orders, reviews,
    user_credentials, users,
};

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::UserRole)]
pub enum UserRole {
    Customer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(UserRole::Customer),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl ToSql<crate::schema::sql_types::UserRole, Pg> for UserRole {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            UserRole::Customer => out.write_all(b"CUSTOMER")?,
            UserRole::Admin => out.write_all(b"ADMIN")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::UserRole, Pg> for UserRole {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"CUSTOMER" => Ok(UserRole::Customer),
            b"ADMIN" => Ok(UserRole::Admin),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Hash, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::CredentialType)]
pub enum CredentialType {
    Passphrase,
}

impl ToSql<crate::schema::sql_types::CredentialType, Pg> for CredentialType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            CredentialType::Passphrase => out.write_all(b"PASSPHRASE")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::CredentialType, Pg> for CredentialType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"PASSPHRASE" => Ok(CredentialType::Passphrase),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::DishCategory)]
pub enum DishCategory {
    Appetizer,
    MainCourse,
    Dessert,
    Drinks,
}

impl DishCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DishCategory::Appetizer => "Appetizer",
            DishCategory::MainCourse => "Main Course",
            DishCategory::Dessert => "Dessert",
            DishCategory::Drinks => "Drinks",
        }
    }

    /// Menu filters arrive in whatever casing the client used.
    pub fn from_param(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "appetizer" => Some(DishCategory::Appetizer),
            "main course" => Some(DishCategory::MainCourse),
            "dessert" => Some(DishCategory::Dessert),
            "drinks" => Some(DishCategory::Drinks),
            _ => None,
        }
    }
}

impl ToSql<crate::schema::sql_types::DishCategory, Pg> for DishCategory {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            DishCategory::Appetizer => out.write_all(b"APPETIZER")?,
            DishCategory::MainCourse => out.write_all(b"MAIN_COURSE")?,
            DishCategory::Dessert => out.write_all(b"DESSERT")?,
            DishCategory::Drinks => out.write_all(b"DRINKS")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::DishCategory, Pg> for DishCategory {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"APPETIZER" => Ok(DishCategory::Appetizer),
            b"MAIN_COURSE" => Ok(DishCategory::MainCourse),
            b"DESSERT" => Ok(DishCategory::Dessert),
            b"DRINKS" => Ok(DishCategory::Drinks),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::OrderStatus)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl ToSql<crate::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            OrderStatus::Pending => out.write_all(b"PENDING")?,
            OrderStatus::Processing => out.write_all(b"PROCESSING")?,
            OrderStatus::Shipped => out.write_all(b"SHIPPED")?,
            OrderStatus::Delivered => out.write_all(b"DELIVERED")?,
            OrderStatus::Cancelled => out.write_all(b"CANCELLED")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"PENDING" => Ok(OrderStatus::Pending),
            b"PROCESSING" => Ok(OrderStatus::Processing),
            b"SHIPPED" => Ok(OrderStatus::Shipped),
            b"DELIVERED" => Ok(OrderStatus::Delivered),
            b"CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::MailKind)]
pub enum MailKind {
    NewsletterWelcome,
    OrderConfirmation,
}

impl ToSql<crate::schema::sql_types::MailKind, Pg> for MailKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            MailKind::NewsletterWelcome => out.write_all(b"NEWSLETTER_WELCOME")?,
            MailKind::OrderConfirmation => out.write_all(b"ORDER_CONFIRMATION")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::MailKind, Pg> for MailKind {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"NEWSLETTER_WELCOME" => Ok(MailKind::NewsletterWelcome),
            b"ORDER_CONFIRMATION" => Ok(MailKind::OrderConfirmation),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub photo_url: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = users)]
pub struct ProfileChanges {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
}

/// Back-office edits may also move a user between roles.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = users)]
pub struct AdminUserChanges {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub role: UserRole,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = user_credentials, primary_key(user_id, credential_type))]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub credential_type: CredentialType,
    pub sub: String,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq, Clone)]
#[diesel(table_name = dishes)]
pub struct Dish {
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub price: BigDecimal,
    pub category: DishCategory,
    pub image_url: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Admin edits replace every mutable column; `id`, `created_by` and
/// `created_at` stay as inserted.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = dishes, treat_none_as_null = true)]
pub struct DishChanges {
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub price: BigDecimal,
    pub category: DishCategory,
    pub image_url: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq, Clone)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Dish))]
#[diesel(table_name = carts, primary_key(user_id, dish_id))]
pub struct CartLine {
    pub user_id: Uuid,
    pub dish_id: Uuid,
    pub quantity: i32,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq, Clone)]
#[diesel(belongs_to(User))]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq, Clone)]
#[diesel(belongs_to(Order))]
#[diesel(table_name = order_items)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub dish_id: Option<Uuid>,
    pub title: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq, Clone)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Dish))]
#[diesel(table_name = reviews)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dish_id: Uuid,
    pub rating: i32,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Debug, PartialEq)]
#[diesel(table_name = newsletter_subscribers)]
pub struct NewsletterSubscriber {
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, PartialEq)]
#[diesel(table_name = mail_outbox)]
pub struct MailOutbox {
    pub id: i32,
    pub kind: MailKind,
    pub recipient: String,
    pub payload: Value,
    pub attempts: i32,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = mail_outbox)]
pub struct NewMailOutbox {
    pub kind: MailKind,
    pub recipient: String,
    pub payload: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dish_category_parses_any_casing() {
        assert_eq!(
            DishCategory::from_param("main course"),
            Some(DishCategory::MainCourse)
        );
        assert_eq!(
            DishCategory::from_param("Main Course"),
            Some(DishCategory::MainCourse)
        );
        assert_eq!(
            DishCategory::from_param("DESSERT"),
            Some(DishCategory::Dessert)
        );
        assert_eq!(DishCategory::from_param("sides"), None);
    }

    #[test]
    fn order_status_round_trips_through_params() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_param(status.as_str()), Some(status));
        }
        // Admin clients have historically sent capitalized labels.
        assert_eq!(
            OrderStatus::from_param("Shipped"),
            Some(OrderStatus::Shipped)
        );
        assert_eq!(OrderStatus::from_param("refunded"), None);
    }

    #[test]
    fn user_role_rejects_unknown_values() {
        assert_eq!(UserRole::from_param("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_param("customer"), Some(UserRole::Customer));
        assert_eq!(UserRole::from_param("root"), None);
        assert_eq!(UserRole::from_param("Admin"), None);
    }
}
