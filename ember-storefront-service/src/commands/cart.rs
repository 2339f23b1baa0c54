use bigdecimal::BigDecimal;
use diesel::{prelude::*, PgConnection};
use uuid::Uuid;

use super::CommandError;
use crate::models::{CartLine, Dish};
use crate::schema;

pub fn list(
    conn: &mut PgConnection,
    user_id: &Uuid,
) -> Result<Vec<(CartLine, Dish)>, CommandError> {
    let rows = schema::carts::table
        .inner_join(schema::dishes::table)
        .filter(schema::carts::user_id.eq(user_id))
        .order(schema::dishes::title.asc())
        .select((CartLine::as_select(), Dish::as_select()))
        .load::<(CartLine, Dish)>(conn)?;
    Ok(rows)
}

/// Grand total over current dish prices. Prices are read live, so a dish
/// edit moves every cart that still holds that dish.
pub fn cart_total(rows: &[(CartLine, Dish)]) -> BigDecimal {
    rows.iter().fold(BigDecimal::from(0), |acc, (line, dish)| {
        acc + dish.price.clone() * BigDecimal::from(line.quantity)
    })
}

/// Adding a dish always leaves its line at quantity 1, even when the line
/// already existed with a larger quantity.
pub fn add(
    conn: &mut PgConnection,
    user_id: &Uuid,
    dish_id: &Uuid,
) -> Result<CartLine, CommandError> {
    schema::dishes::table
        .find(dish_id)
        .select(Dish::as_select())
        .first::<Dish>(conn)
        .optional()?
        .ok_or(CommandError::NotFound("Dish"))?;

    let line = CartLine {
        user_id: *user_id,
        dish_id: *dish_id,
        quantity: 1,
    };
    let row = diesel::insert_into(schema::carts::table)
        .values(&line)
        .on_conflict((schema::carts::user_id, schema::carts::dish_id))
        .do_update()
        .set(schema::carts::quantity.eq(1))
        .returning(CartLine::as_returning())
        .get_result(conn)?;
    Ok(row)
}

pub fn set_quantity(
    conn: &mut PgConnection,
    user_id: &Uuid,
    dish_id: &Uuid,
    quantity: i32,
) -> Result<CartLine, CommandError> {
    validate_quantity(quantity)?;

    diesel::update(schema::carts::table.find((user_id, dish_id)))
        .set(schema::carts::quantity.eq(quantity))
        .returning(CartLine::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(CommandError::NotFound("Cart line"))
}

pub fn remove(
    conn: &mut PgConnection,
    user_id: &Uuid,
    dish_id: &Uuid,
) -> Result<(), CommandError> {
    let deleted =
        diesel::delete(schema::carts::table.find((user_id, dish_id))).execute(conn)?;
    if deleted == 0 {
        return Err(CommandError::NotFound("Cart line"));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i32) -> Result<(), CommandError> {
    if quantity < 1 {
        return Err(CommandError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::DishCategory;

    fn dish(price: &str) -> Dish {
        Dish {
            id: Uuid::new_v4(),
            title: "Dish".to_string(),
            short_description: "short".to_string(),
            description: "long".to_string(),
            price: price.parse::<BigDecimal>().unwrap(),
            category: DishCategory::MainCourse,
            image_url: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    fn line(dish: &Dish, quantity: i32) -> CartLine {
        CartLine {
            user_id: Uuid::new_v4(),
            dish_id: dish.id,
            quantity,
        }
    }

    #[test]
    fn cart_total_sums_quantity_times_price() {
        let a = dish("10.00");
        let b = dish("5.00");
        let rows = vec![(line(&a, 2), a.clone()), (line(&b, 1), b)];

        assert_eq!(cart_total(&rows), "25.00".parse::<BigDecimal>().unwrap());
        assert_eq!(cart_total(&[]), BigDecimal::from(0));
    }

    #[test]
    fn cart_total_follows_the_current_dish_price() {
        let a = dish("10.00");
        let cart_line = line(&a, 2);

        let mut repriced = a.clone();
        repriced.price = "12.00".parse::<BigDecimal>().unwrap();
        let rows = vec![(cart_line, repriced)];

        assert_eq!(cart_total(&rows), "24.00".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn quantities_below_one_are_rejected() {
        assert!(matches!(
            validate_quantity(0),
            Err(CommandError::Validation(_))
        ));
        assert!(matches!(
            validate_quantity(-3),
            Err(CommandError::Validation(_))
        ));
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(7).is_ok());
    }

    // Needs a live DATABASE_URL; run with `cargo test -- --ignored`.
    #[test]
    #[ignore]
    fn adding_an_existing_line_resets_its_quantity_to_one() {
        use crate::models::{User, UserRole};

        let conn = &mut crate::establish_connection();
        conn.test_transaction::<_, CommandError, _>(|conn| {
            let user = User {
                id: Uuid::new_v4(),
                first_name: "Mina".to_string(),
                last_name: "Park".to_string(),
                email: format!("{}@example.com", Uuid::new_v4()),
                phone: "010-1234-5678".to_string(),
                address: "12 Ember Lane".to_string(),
                photo_url: None,
                role: UserRole::Customer,
                created_at: Utc::now(),
            };
            diesel::insert_into(schema::users::table)
                .values(&user)
                .execute(conn)?;
            let menu_dish = dish("10.00");
            diesel::insert_into(schema::dishes::table)
                .values(&menu_dish)
                .execute(conn)?;

            add(conn, &user.id, &menu_dish.id)?;
            set_quantity(conn, &user.id, &menu_dish.id, 5)?;
            let line = add(conn, &user.id, &menu_dish.id)?;

            assert_eq!(line.quantity, 1);
            Ok(())
        });
    }
}
