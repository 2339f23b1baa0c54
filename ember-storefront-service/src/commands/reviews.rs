use chrono::Utc;
use diesel::{prelude::*, PgConnection};
use uuid::Uuid;

use super::CommandError;
use crate::models::{Dish, Review, User};
use crate::schema;

pub fn submit(
    conn: &mut PgConnection,
    user_id: &Uuid,
    dish_id: &Uuid,
    rating: i32,
    review_text: &str,
) -> Result<Review, CommandError> {
    validate_rating(rating)?;
    let review_text = validated_text(review_text)?;

    super::catalog::get_dish(conn, dish_id)?;

    let review = Review {
        id: Uuid::new_v4(),
        user_id: *user_id,
        dish_id: *dish_id,
        rating,
        review_text: review_text.to_string(),
        created_at: Utc::now(),
    };
    diesel::insert_into(schema::reviews::table)
        .values(&review)
        .execute(conn)?;
    Ok(review)
}

pub fn list_for_user(
    conn: &mut PgConnection,
    user_id: &Uuid,
) -> Result<Vec<(Review, Dish)>, CommandError> {
    let rows = schema::reviews::table
        .inner_join(schema::dishes::table)
        .filter(schema::reviews::user_id.eq(user_id))
        .order(schema::reviews::created_at.desc())
        .select((Review::as_select(), Dish::as_select()))
        .load::<(Review, Dish)>(conn)?;
    Ok(rows)
}

pub fn list_all(conn: &mut PgConnection) -> Result<Vec<(Review, User, Dish)>, CommandError> {
    let rows = schema::reviews::table
        .inner_join(schema::users::table)
        .inner_join(schema::dishes::table)
        .order(schema::reviews::created_at.desc())
        .select((Review::as_select(), User::as_select(), Dish::as_select()))
        .load::<(Review, User, Dish)>(conn)?;
    Ok(rows)
}

pub fn update(
    conn: &mut PgConnection,
    review_id: &Uuid,
    rating: i32,
    review_text: &str,
) -> Result<Review, CommandError> {
    validate_rating(rating)?;
    let review_text = validated_text(review_text)?;

    diesel::update(schema::reviews::table.find(review_id))
        .set((
            schema::reviews::rating.eq(rating),
            schema::reviews::review_text.eq(review_text),
        ))
        .returning(Review::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(CommandError::NotFound("Review"))
}

/// Scoped to the author; touching someone else's review reads as missing.
pub fn update_own(
    conn: &mut PgConnection,
    user_id: &Uuid,
    review_id: &Uuid,
    rating: i32,
    review_text: &str,
) -> Result<Review, CommandError> {
    validate_rating(rating)?;
    let review_text = validated_text(review_text)?;

    diesel::update(
        schema::reviews::table
            .find(review_id)
            .filter(schema::reviews::user_id.eq(user_id)),
    )
    .set((
        schema::reviews::rating.eq(rating),
        schema::reviews::review_text.eq(review_text),
    ))
    .returning(Review::as_returning())
    .get_result(conn)
    .optional()?
    .ok_or(CommandError::NotFound("Review"))
}

pub fn delete(conn: &mut PgConnection, review_id: &Uuid) -> Result<(), CommandError> {
    let deleted = diesel::delete(schema::reviews::table.find(review_id)).execute(conn)?;
    if deleted == 0 {
        return Err(CommandError::NotFound("Review"));
    }
    Ok(())
}

pub fn delete_own(
    conn: &mut PgConnection,
    user_id: &Uuid,
    review_id: &Uuid,
) -> Result<(), CommandError> {
    let deleted = diesel::delete(
        schema::reviews::table
            .find(review_id)
            .filter(schema::reviews::user_id.eq(user_id)),
    )
    .execute(conn)?;
    if deleted == 0 {
        return Err(CommandError::NotFound("Review"));
    }
    Ok(())
}

pub fn validate_rating(rating: i32) -> Result<(), CommandError> {
    if !(1..=5).contains(&rating) {
        return Err(CommandError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

fn validated_text(review_text: &str) -> Result<&str, CommandError> {
    let review_text = review_text.trim();
    if review_text.is_empty() {
        return Err(CommandError::Validation(
            "Review text is required".to_string(),
        ));
    }
    Ok(review_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_outside_one_to_five_are_rejected() {
        assert!(matches!(
            validate_rating(0),
            Err(CommandError::Validation(_))
        ));
        assert!(matches!(
            validate_rating(6),
            Err(CommandError::Validation(_))
        ));
        assert!(matches!(
            validate_rating(-2),
            Err(CommandError::Validation(_))
        ));
        for ok in 1..=5 {
            assert!(validate_rating(ok).is_ok());
        }
    }

    #[test]
    fn review_text_is_trimmed_and_must_not_be_blank() {
        assert!(matches!(
            validated_text("   "),
            Err(CommandError::Validation(_))
        ));
        assert_eq!(validated_text(" tasty ").unwrap(), "tasty");
    }
}
