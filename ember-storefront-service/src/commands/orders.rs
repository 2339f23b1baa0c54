use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::{prelude::*, PgConnection};
use uuid::Uuid;

use super::CommandError;
use crate::models::{CartLine, Dish, Order, OrderLine, OrderStatus};
use crate::notifications::MailPublisher;
use crate::schema;

#[derive(Debug, Clone, PartialEq)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
}

pub fn validate_contact(contact: &ContactDetails) -> Result<ContactDetails, CommandError> {
    let trimmed = ContactDetails {
        first_name: contact.first_name.trim().to_string(),
        last_name: contact.last_name.trim().to_string(),
        phone: contact.phone.trim().to_string(),
        address: contact.address.trim().to_string(),
        email: contact.email.trim().to_string(),
    };
    if trimmed.first_name.is_empty()
        || trimmed.last_name.is_empty()
        || trimmed.phone.is_empty()
        || trimmed.address.is_empty()
        || trimmed.email.is_empty()
    {
        return Err(CommandError::Validation(
            "All contact fields are required".to_string(),
        ));
    }
    Ok(trimmed)
}

fn lines_total(lines: &[OrderLine]) -> BigDecimal {
    lines.iter().fold(BigDecimal::from(0), |acc, line| {
        acc + line.price.clone() * BigDecimal::from(line.quantity)
    })
}

/// Snapshots the cart into an order. Line items copy the dish title and
/// price at this instant; later dish edits never touch them.
pub fn build_order(
    user_id: &Uuid,
    contact: &ContactDetails,
    rows: &[(CartLine, Dish)],
) -> (Order, Vec<OrderLine>) {
    let order_id = Uuid::new_v4();
    let lines: Vec<OrderLine> = rows
        .iter()
        .map(|(line, dish)| OrderLine {
            id: Uuid::new_v4(),
            order_id,
            dish_id: Some(dish.id),
            title: dish.title.clone(),
            price: dish.price.clone(),
            quantity: line.quantity,
        })
        .collect();
    let total = lines_total(&lines);

    let order = Order {
        id: order_id,
        user_id: *user_id,
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
        phone: contact.phone.clone(),
        address: contact.address.clone(),
        email: contact.email.clone(),
        total_amount: total,
        status: OrderStatus::Pending,
        order_date: Utc::now(),
    };
    (order, lines)
}

/// Places an order from the current cart. The order row, its line items,
/// the cart clear and the queued confirmation mail commit or roll back as
/// one transaction.
pub fn place(
    conn: &mut PgConnection,
    user_id: &Uuid,
    contact: &ContactDetails,
) -> Result<(Order, Vec<OrderLine>), CommandError> {
    let contact = validate_contact(contact)?;

    let rows = super::cart::list(conn, user_id)?;
    if rows.is_empty() {
        return Err(CommandError::Validation("Cart is empty".to_string()));
    }

    let (order, lines) = build_order(user_id, &contact, &rows);

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::insert_into(schema::orders::table)
            .values(&order)
            .execute(conn)?;
        diesel::insert_into(schema::order_items::table)
            .values(&lines)
            .execute(conn)?;
        diesel::delete(schema::carts::table.filter(schema::carts::user_id.eq(user_id)))
            .execute(conn)?;

        let mut publisher = MailPublisher::new(conn);
        publisher.order_confirmation(&order, &lines)?;

        Ok(())
    })?;

    Ok((order, lines))
}

pub struct OrderLineDraft {
    pub dish_id: Option<Uuid>,
    pub title: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

pub struct OrderDraft {
    pub user_id: Uuid,
    pub contact: ContactDetails,
    pub status: OrderStatus,
    pub lines: Vec<OrderLineDraft>,
}

fn validate_lines(lines: &[OrderLineDraft]) -> Result<(), CommandError> {
    if lines.is_empty() {
        return Err(CommandError::Validation(
            "At least one order item is required".to_string(),
        ));
    }
    for line in lines {
        if line.title.trim().is_empty() {
            return Err(CommandError::Validation(
                "Item title is required".to_string(),
            ));
        }
        if line.price < BigDecimal::from(0) {
            return Err(CommandError::Validation(
                "Item price must not be negative".to_string(),
            ));
        }
        if line.quantity < 1 {
            return Err(CommandError::Validation(
                "Item quantity must be at least 1".to_string(),
            ));
        }
    }
    Ok(())
}

/// Back-office pass-through insert. The total is derived from the given
/// lines so hand-entered orders keep the total/lines relationship, and no
/// confirmation mail is queued.
pub fn admin_insert(
    conn: &mut PgConnection,
    draft: OrderDraft,
) -> Result<(Order, Vec<OrderLine>), CommandError> {
    let contact = validate_contact(&draft.contact)?;
    validate_lines(&draft.lines)?;
    super::users::get(conn, &draft.user_id)?;

    let order_id = Uuid::new_v4();
    let lines: Vec<OrderLine> = draft
        .lines
        .into_iter()
        .map(|line| OrderLine {
            id: Uuid::new_v4(),
            order_id,
            dish_id: line.dish_id,
            title: line.title,
            price: line.price,
            quantity: line.quantity,
        })
        .collect();
    let order = Order {
        id: order_id,
        user_id: draft.user_id,
        first_name: contact.first_name,
        last_name: contact.last_name,
        phone: contact.phone,
        address: contact.address,
        email: contact.email,
        total_amount: lines_total(&lines),
        status: draft.status,
        order_date: Utc::now(),
    };

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::insert_into(schema::orders::table)
            .values(&order)
            .execute(conn)?;
        diesel::insert_into(schema::order_items::table)
            .values(&lines)
            .execute(conn)?;
        Ok(())
    })?;

    Ok((order, lines))
}

pub fn list_for_user(
    conn: &mut PgConnection,
    user_id: &Uuid,
) -> Result<Vec<(Order, Vec<OrderLine>)>, CommandError> {
    let orders = schema::orders::table
        .filter(schema::orders::user_id.eq(user_id))
        .order(schema::orders::order_date.desc())
        .select(Order::as_select())
        .load::<Order>(conn)?;
    let lines = OrderLine::belonging_to(&orders)
        .select(OrderLine::as_select())
        .load::<OrderLine>(conn)?;
    let grouped = lines.grouped_by(&orders);
    Ok(orders.into_iter().zip(grouped).collect())
}

pub fn list_all(conn: &mut PgConnection) -> Result<Vec<(Order, Vec<OrderLine>)>, CommandError> {
    let orders = schema::orders::table
        .order(schema::orders::order_date.desc())
        .select(Order::as_select())
        .load::<Order>(conn)?;
    let lines = OrderLine::belonging_to(&orders)
        .select(OrderLine::as_select())
        .load::<OrderLine>(conn)?;
    let grouped = lines.grouped_by(&orders);
    Ok(orders.into_iter().zip(grouped).collect())
}

pub fn get(
    conn: &mut PgConnection,
    order_id: &Uuid,
) -> Result<(Order, Vec<OrderLine>), CommandError> {
    let order = schema::orders::table
        .find(order_id)
        .select(Order::as_select())
        .first::<Order>(conn)
        .optional()?
        .ok_or(CommandError::NotFound("Order"))?;
    let lines = OrderLine::belonging_to(&order)
        .select(OrderLine::as_select())
        .load::<OrderLine>(conn)?;
    Ok((order, lines))
}

/// Owners may withdraw an order only while it is still pending. Orders of
/// other users are reported as missing rather than forbidden.
pub fn delete_own_pending(
    conn: &mut PgConnection,
    user_id: &Uuid,
    order_id: &Uuid,
) -> Result<(), CommandError> {
    conn.transaction(|conn| {
        let order = schema::orders::table
            .find(order_id)
            .select(Order::as_select())
            .for_update()
            .first::<Order>(conn)
            .optional()?
            .ok_or(CommandError::NotFound("Order"))?;
        if order.user_id != *user_id {
            return Err(CommandError::NotFound("Order"));
        }
        if order.status != OrderStatus::Pending {
            return Err(CommandError::Conflict(
                "Only pending orders can be cancelled".to_string(),
            ));
        }

        diesel::delete(schema::orders::table.find(order_id)).execute(conn)?;
        Ok(())
    })
}

pub fn set_status(
    conn: &mut PgConnection,
    order_id: &Uuid,
    status: OrderStatus,
) -> Result<Order, CommandError> {
    diesel::update(schema::orders::table.find(order_id))
        .set(schema::orders::status.eq(status))
        .returning(Order::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(CommandError::NotFound("Order"))
}

pub fn delete(conn: &mut PgConnection, order_id: &Uuid) -> Result<(), CommandError> {
    let deleted = diesel::delete(schema::orders::table.find(order_id)).execute(conn)?;
    if deleted == 0 {
        return Err(CommandError::NotFound("Order"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::models::DishCategory;

    use super::*;

    fn contact() -> ContactDetails {
        ContactDetails {
            first_name: "Mina".to_string(),
            last_name: "Park".to_string(),
            phone: "010-1234-5678".to_string(),
            address: "12 Ember Lane".to_string(),
            email: "mina@example.com".to_string(),
        }
    }

    fn dish(title: &str, price: &str) -> Dish {
        Dish {
            id: Uuid::new_v4(),
            title: title.to_string(),
            short_description: "short".to_string(),
            description: "long".to_string(),
            price: price.parse::<BigDecimal>().unwrap(),
            category: DishCategory::MainCourse,
            image_url: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    fn cart_row(user_id: &Uuid, dish: &Dish, quantity: i32) -> (CartLine, Dish) {
        (
            CartLine {
                user_id: *user_id,
                dish_id: dish.id,
                quantity,
            },
            dish.clone(),
        )
    }

    #[test]
    fn validate_contact_trims_and_requires_every_field() {
        let trimmed = validate_contact(&ContactDetails {
            first_name: "  Mina ".to_string(),
            ..contact()
        })
        .unwrap();
        assert_eq!(trimmed.first_name, "Mina");

        for blank in [
            ContactDetails {
                first_name: "   ".to_string(),
                ..contact()
            },
            ContactDetails {
                email: String::new(),
                ..contact()
            },
            ContactDetails {
                address: "\t".to_string(),
                ..contact()
            },
        ] {
            assert!(matches!(
                validate_contact(&blank),
                Err(CommandError::Validation(_))
            ));
        }
    }

    #[test]
    fn build_order_totals_the_cart_snapshot() {
        let user_id = Uuid::new_v4();
        let a = dish("Bulgogi Bowl", "10.00");
        let b = dish("Citrus Tea", "5.00");
        let rows = vec![cart_row(&user_id, &a, 2), cart_row(&user_id, &b, 1)];

        let (order, lines) = build_order(&user_id, &contact(), &rows);

        assert_eq!(order.total_amount, "25.00".parse::<BigDecimal>().unwrap());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.user_id, user_id);
        assert_eq!(order.first_name, "Mina");
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.order_id == order.id));
        assert_eq!(lines[0].title, "Bulgogi Bowl");
        assert_eq!(lines[0].price, "10.00".parse::<BigDecimal>().unwrap());
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[1].dish_id, Some(b.id));
    }

    #[test]
    fn order_lines_keep_the_placement_time_price() {
        let user_id = Uuid::new_v4();
        let mut a = dish("Bulgogi Bowl", "10.00");
        let rows = vec![cart_row(&user_id, &a, 2)];

        let (order, lines) = build_order(&user_id, &contact(), &rows);

        a.price = "12.00".parse::<BigDecimal>().unwrap();
        assert_eq!(lines[0].price, "10.00".parse::<BigDecimal>().unwrap());
        assert_eq!(order.total_amount, "20.00".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn hand_entered_lines_are_validated() {
        let good = || OrderLineDraft {
            dish_id: None,
            title: "Bulgogi Bowl".to_string(),
            price: "10.00".parse::<BigDecimal>().unwrap(),
            quantity: 2,
        };

        assert!(validate_lines(&[good()]).is_ok());
        assert!(matches!(
            validate_lines(&[]),
            Err(CommandError::Validation(_))
        ));
        assert!(matches!(
            validate_lines(&[OrderLineDraft {
                title: "   ".to_string(),
                ..good()
            }]),
            Err(CommandError::Validation(_))
        ));
        assert!(matches!(
            validate_lines(&[OrderLineDraft {
                price: "-1".parse::<BigDecimal>().unwrap(),
                ..good()
            }]),
            Err(CommandError::Validation(_))
        ));
        assert!(matches!(
            validate_lines(&[OrderLineDraft {
                quantity: 0,
                ..good()
            }]),
            Err(CommandError::Validation(_))
        ));
    }

    // Needs a live DATABASE_URL; run with `cargo test -- --ignored`.
    #[test]
    #[ignore]
    fn placing_an_order_clears_the_cart_and_queues_one_confirmation() {
        use crate::commands::cart;
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
            let a = dish("Bulgogi Bowl", "10.00");
            let b = dish("Citrus Tea", "5.00");
            diesel::insert_into(schema::dishes::table)
                .values(&vec![a.clone(), b.clone()])
                .execute(conn)?;

            cart::add(conn, &user.id, &a.id)?;
            cart::set_quantity(conn, &user.id, &a.id, 2)?;
            cart::add(conn, &user.id, &b.id)?;

            let details = ContactDetails {
                email: user.email.clone(),
                ..contact()
            };
            let (order, lines) = place(conn, &user.id, &details)?;

            assert_eq!(order.total_amount, "25.00".parse::<BigDecimal>().unwrap());
            assert_eq!(lines.len(), 2);
            assert!(cart::list(conn, &user.id)?.is_empty());

            let queued = schema::mail_outbox::table
                .filter(schema::mail_outbox::recipient.eq(&user.email))
                .count()
                .get_result::<i64>(conn)?;
            assert_eq!(queued, 1);
            Ok(())
        });
    }
}
