use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::{prelude::*, PgConnection};
use uuid::Uuid;

use super::CommandError;
use crate::models::{Dish, DishCategory, DishChanges, Review, User};
use crate::schema;

pub struct DishDraft {
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub price: BigDecimal,
    pub category: DishCategory,
    pub image_url: Option<String>,
}

pub fn list_dishes(
    conn: &mut PgConnection,
    category: Option<DishCategory>,
) -> Result<Vec<Dish>, CommandError> {
    let mut query = schema::dishes::table
        .order(schema::dishes::created_at.desc())
        .select(Dish::as_select())
        .into_boxed();
    if let Some(category) = category {
        query = query.filter(schema::dishes::category.eq(category));
    }
    Ok(query.load::<Dish>(conn)?)
}

pub fn get_dish(conn: &mut PgConnection, dish_id: &Uuid) -> Result<Dish, CommandError> {
    schema::dishes::table
        .find(dish_id)
        .select(Dish::as_select())
        .first::<Dish>(conn)
        .optional()?
        .ok_or(CommandError::NotFound("Dish"))
}

pub fn dish_reviews(
    conn: &mut PgConnection,
    dish_id: &Uuid,
) -> Result<Vec<(Review, User)>, CommandError> {
    get_dish(conn, dish_id)?;

    let rows = schema::reviews::table
        .inner_join(schema::users::table)
        .filter(schema::reviews::dish_id.eq(dish_id))
        .order(schema::reviews::created_at.desc())
        .select((Review::as_select(), User::as_select()))
        .load::<(Review, User)>(conn)?;
    Ok(rows)
}

pub fn create_dish(
    conn: &mut PgConnection,
    created_by: &Uuid,
    draft: DishDraft,
) -> Result<Dish, CommandError> {
    validate_draft(&draft)?;

    let dish = Dish {
        id: Uuid::new_v4(),
        title: draft.title,
        short_description: draft.short_description,
        description: draft.description,
        price: draft.price,
        category: draft.category,
        image_url: draft.image_url,
        created_by: Some(*created_by),
        created_at: Utc::now(),
    };
    diesel::insert_into(schema::dishes::table)
        .values(&dish)
        .execute(conn)?;
    Ok(dish)
}

pub fn update_dish(
    conn: &mut PgConnection,
    dish_id: &Uuid,
    draft: DishDraft,
) -> Result<Dish, CommandError> {
    validate_draft(&draft)?;

    diesel::update(schema::dishes::table.find(dish_id))
        .set(DishChanges {
            title: draft.title,
            short_description: draft.short_description,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            image_url: draft.image_url,
        })
        .returning(Dish::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(CommandError::NotFound("Dish"))
}

/// Cart lines and reviews of the dish go with it; placed order lines keep
/// their snapshot and lose only the dish reference.
pub fn delete_dish(conn: &mut PgConnection, dish_id: &Uuid) -> Result<(), CommandError> {
    let deleted = diesel::delete(schema::dishes::table.find(dish_id)).execute(conn)?;
    if deleted == 0 {
        return Err(CommandError::NotFound("Dish"));
    }
    Ok(())
}

pub fn validate_draft(draft: &DishDraft) -> Result<(), CommandError> {
    if draft.title.trim().is_empty()
        || draft.short_description.trim().is_empty()
        || draft.description.trim().is_empty()
    {
        return Err(CommandError::Validation(
            "Title and descriptions are required".to_string(),
        ));
    }
    if draft.price < BigDecimal::from(0) {
        return Err(CommandError::Validation(
            "Price must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> DishDraft {
        DishDraft {
            title: "Bulgogi Bowl".to_string(),
            short_description: "Rice bowl".to_string(),
            description: "Marinated beef over rice".to_string(),
            price: "10.00".parse::<BigDecimal>().unwrap(),
            category: DishCategory::MainCourse,
            image_url: None,
        }
    }

    #[test]
    fn draft_validation_requires_text_fields() {
        assert!(validate_draft(&draft()).is_ok());

        let blank_title = DishDraft {
            title: "  ".to_string(),
            ..draft()
        };
        assert!(matches!(
            validate_draft(&blank_title),
            Err(CommandError::Validation(_))
        ));

        let blank_description = DishDraft {
            description: String::new(),
            ..draft()
        };
        assert!(matches!(
            validate_draft(&blank_description),
            Err(CommandError::Validation(_))
        ));
    }

    #[test]
    fn draft_validation_rejects_negative_prices() {
        let negative = DishDraft {
            price: "-0.01".parse::<BigDecimal>().unwrap(),
            ..draft()
        };
        assert!(matches!(
            validate_draft(&negative),
            Err(CommandError::Validation(_))
        ));

        let free = DishDraft {
            price: BigDecimal::from(0),
            ..draft()
        };
        assert!(validate_draft(&free).is_ok());
    }
}
