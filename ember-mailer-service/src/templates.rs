use std::str::FromStr;

use bigdecimal::BigDecimal;
use ember_mailer_api::SendConfirmationPayload;

use crate::error::RelayError;

/// A rendered message, ready to hand to the provider.
pub struct Mail {
    pub subject: String,
    pub html: String,
}

/// The fixed welcome note sent on newsletter signup.
pub fn newsletter_welcome() -> Mail {
    Mail {
        subject: "Welcome to Ember Kitchen!".to_string(),
        html: "<h2>Thanks for subscribing!</h2><p>Get ready for delicious updates!</p>"
            .to_string(),
    }
}

/// Renders the order confirmation with its itemized table.
///
/// Prices arrive as decimal strings; anything unparsable rejects the whole
/// payload before a provider call is attempted.
pub fn order_confirmation(payload: &SendConfirmationPayload) -> Result<Mail, RelayError> {
    let total = money(&payload.total)?;

    let mut rows = String::new();
    for item in &payload.items {
        let line_total = money(&item.price)? * BigDecimal::from(item.quantity);
        rows.push_str(&format!(
            r#"<tr><td style="padding: 4px 8px;">{}</td><td style="padding: 4px 8px;">{}</td><td style="padding: 4px 8px;">${}</td></tr>"#,
            item.title,
            item.quantity,
            line_total.with_scale(2),
        ));
    }

    let html = format!(
        r#"<h2>Thank you, {name}!</h2>
<p>Your order <strong>(ID: {order_id})</strong> has been successfully placed.</p>
<p>Here's a summary of your order:</p>
<table style="border-collapse: collapse; width: 100%; max-width: 500px;">
<thead>
<tr>
<th style="text-align: left; padding: 4px 8px;">Item</th>
<th style="text-align: left; padding: 4px 8px;">Qty</th>
<th style="text-align: left; padding: 4px 8px;">Price</th>
</tr>
</thead>
<tbody>{rows}</tbody>
</table>
<p><strong>Total: ${total}</strong></p>
<p>We'll start cooking right away.</p>
<p>- The Ember Kitchen team</p>"#,
        name = payload.name,
        order_id = payload.order_id,
        rows = rows,
        total = total.with_scale(2),
    );

    Ok(Mail {
        subject: "Your Order is Confirmed!".to_string(),
        html,
    })
}

fn money(raw: &str) -> Result<BigDecimal, RelayError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|_| RelayError::InvalidPayload("Missing or invalid fields".to_string()))
}

#[cfg(test)]
mod tests {
    use ember_mailer_api::ConfirmationItem;
    use uuid::Uuid;

    use super::*;

    fn confirmation() -> SendConfirmationPayload {
        SendConfirmationPayload {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            order_id: Uuid::parse_str("0a0c5005-3b6f-4c33-a969-11f549a04854").unwrap(),
            total: "25.00".to_string(),
            items: vec![
                ConfirmationItem {
                    title: "Garlic Naan".to_string(),
                    quantity: 2,
                    price: "10.00".to_string(),
                },
                ConfirmationItem {
                    title: "Mango Lassi".to_string(),
                    quantity: 1,
                    price: "5.00".to_string(),
                },
            ],
        }
    }

    #[test]
    fn welcome_mail_is_fixed_copy() {
        let mail = newsletter_welcome();
        assert_eq!(mail.subject, "Welcome to Ember Kitchen!");
        assert!(mail.html.contains("Thanks for subscribing!"));
    }

    #[test]
    fn confirmation_lists_every_line_with_its_line_total() {
        let mail = order_confirmation(&confirmation()).unwrap();
        assert_eq!(mail.subject, "Your Order is Confirmed!");
        assert!(mail.html.contains("Thank you, Ada!"));
        assert!(mail
            .html
            .contains("(ID: 0a0c5005-3b6f-4c33-a969-11f549a04854)"));
        assert!(mail.html.contains("Garlic Naan"));
        assert!(mail.html.contains("$20.00"));
        assert!(mail.html.contains("Mango Lassi"));
        assert!(mail.html.contains("$5.00"));
        assert!(mail.html.contains("Total: $25.00"));
    }

    #[test]
    fn integer_prices_render_with_two_decimals() {
        let mut payload = confirmation();
        payload.items[0].price = "10".to_string();
        payload.total = "25".to_string();
        let mail = order_confirmation(&payload).unwrap();
        assert!(mail.html.contains("$20.00"));
        assert!(mail.html.contains("Total: $25.00"));
    }

    #[test]
    fn unparsable_money_is_rejected() {
        let mut payload = confirmation();
        payload.items[0].price = "ten".to_string();
        assert!(matches!(
            order_confirmation(&payload),
            Err(RelayError::InvalidPayload(_))
        ));

        let mut payload = confirmation();
        payload.total = String::new();
        assert!(order_confirmation(&payload).is_err());
    }
}
