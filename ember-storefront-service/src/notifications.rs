use diesel::{prelude::*, PgConnection};
use ember_mailer_api::{ConfirmationItem, SendConfirmationPayload, SendNewsletterPayload};
use serde_json::Value;

use crate::models::{MailKind, NewMailOutbox, Order, OrderLine};
use crate::schema;

/// Queues outgoing mail in the `mail_outbox` table. Rows are written inside
/// the caller's transaction and picked up later by the notifier worker, so a
/// mail failure can never undo a committed order.
pub struct MailPublisher<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> MailPublisher<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub fn newsletter_welcome(&mut self, email: &str) -> Result<(), diesel::result::Error> {
        let payload = SendNewsletterPayload {
            email: email.to_string(),
        };
        self.publish(
            MailKind::NewsletterWelcome,
            email,
            serde_json::to_value(payload).unwrap(),
        )
    }

    pub fn order_confirmation(
        &mut self,
        order: &Order,
        lines: &[OrderLine],
    ) -> Result<(), diesel::result::Error> {
        let payload = confirmation_payload(order, lines);
        self.publish(
            MailKind::OrderConfirmation,
            &order.email,
            serde_json::to_value(payload).unwrap(),
        )
    }

    fn publish(
        &mut self,
        kind: MailKind,
        recipient: &str,
        payload: Value,
    ) -> Result<(), diesel::result::Error> {
        diesel::insert_into(schema::mail_outbox::table)
            .values(NewMailOutbox {
                kind,
                recipient: recipient.to_string(),
                payload,
            })
            .execute(self.conn)
            .map(|_| ())
    }
}

pub fn confirmation_payload(order: &Order, lines: &[OrderLine]) -> SendConfirmationPayload {
    SendConfirmationPayload {
        email: order.email.clone(),
        name: format!("{} {}", order.first_name, order.last_name),
        order_id: order.id,
        total: order.total_amount.to_string(),
        items: lines
            .iter()
            .map(|line| ConfirmationItem {
                title: line.title.clone(),
                quantity: line.quantity,
                price: line.price.to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::OrderStatus;

    #[test]
    fn confirmation_payload_carries_the_order_snapshot() {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: "Mina".to_string(),
            last_name: "Park".to_string(),
            phone: "010-1234-5678".to_string(),
            address: "12 Ember Lane".to_string(),
            email: "mina@example.com".to_string(),
            total_amount: "25.00".parse::<BigDecimal>().unwrap(),
            status: OrderStatus::Pending,
            order_date: Utc::now(),
        };
        let lines = vec![
            OrderLine {
                id: Uuid::new_v4(),
                order_id: order.id,
                dish_id: Some(Uuid::new_v4()),
                title: "Bulgogi Bowl".to_string(),
                price: "10.00".parse::<BigDecimal>().unwrap(),
                quantity: 2,
            },
            OrderLine {
                id: Uuid::new_v4(),
                order_id: order.id,
                dish_id: None,
                title: "Citrus Tea".to_string(),
                price: "5.00".parse::<BigDecimal>().unwrap(),
                quantity: 1,
            },
        ];

        let payload = confirmation_payload(&order, &lines);

        assert_eq!(payload.email, "mina@example.com");
        assert_eq!(payload.name, "Mina Park");
        assert_eq!(payload.order_id, order.id);
        assert_eq!(payload.total, "25.00");
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.items[0].title, "Bulgogi Bowl");
        assert_eq!(payload.items[0].quantity, 2);
        assert_eq!(payload.items[0].price, "10.00");
        assert_eq!(payload.items[1].price, "5.00");
    }
}
