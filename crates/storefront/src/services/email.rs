//! Transactional email: order confirmations and password resets.
//!
//! Uses SMTP via lettre with Askama templates for the HTML and plain text
//! parts.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use clothesline_core::Order;

use crate::config::EmailConfig;

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    order: &'a Order,
    orders_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    order: &'a Order,
    orders_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    name: &'a str,
    reset_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetText<'a> {
    name: &'a str,
    reset_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    base_url: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig, base_url: &str) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send the order confirmation to the shipping email.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_confirmation(&self, order: &Order) -> Result<(), EmailError> {
        let orders_url = format!("{}/orders", self.base_url);
        let html = OrderConfirmationHtml {
            order,
            orders_url: &orders_url,
        }
        .render()?;
        let text = OrderConfirmationText {
            order,
            orders_url: &orders_url,
        }
        .render()?;

        self.send_multipart_email(
            &order.shipping_info.email,
            &format!("Your Clothesline order #{}", order.id),
            &text,
            &html,
        )
        .await
    }

    /// Send a password reset link.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let reset_url = reset_url(&self.base_url, token);
        let html = PasswordResetHtml {
            name,
            reset_url: &reset_url,
        }
        .render()?;
        let text = PasswordResetText {
            name,
            reset_url: &reset_url,
        }
        .render()?;

        self.send_multipart_email(to, "Reset your Clothesline password", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Link the customer follows to choose a new password.
fn reset_url(base_url: &str, token: &str) -> String {
    format!("{base_url}/reset-password?token={token}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use clothesline_core::{
        OrderId, OrderItem, OrderStatus, OrderTotals, PaymentMethod, Price, ProductId,
        ShippingInfo, SizeType, UserId,
    };

    use super::*;

    fn order() -> Order {
        Order {
            id: OrderId::new(42),
            user_id: UserId::new(1),
            items: vec![OrderItem {
                product_id: ProductId::from_sequence(3).unwrap(),
                name: "Oxford <Shirt>".to_string(),
                price: Price::from_cents(2999),
                image_url: None,
                size: "L".to_string(),
                size_type: SizeType::Standard,
                quantity: 2,
            }],
            shipping_info: ShippingInfo {
                full_name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: "555-0101".to_string(),
                address: "12 Analytical Way".to_string(),
                city: "London".to_string(),
                state: "LDN".to_string(),
                postal_code: "N1 9GU".to_string(),
                country: "UK".to_string(),
            },
            payment_method: PaymentMethod::Card,
            totals: OrderTotals {
                subtotal: Price::from_cents(5998),
                delivery_fee: Price::from_cents(500),
                order_total: Price::from_cents(6498),
            },
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_confirmation_renders_items_and_totals() {
        let order = order();
        let text = OrderConfirmationText {
            order: &order,
            orders_url: "https://shop.test/orders",
        }
        .render()
        .unwrap();

        assert!(text.contains("order #42"));
        assert!(text.contains("Oxford <Shirt> (size L) x 2: 59.98"));
        assert!(text.contains("64.98"));
    }

    #[test]
    fn test_order_confirmation_html_escapes_names() {
        let order = order();
        let html = OrderConfirmationHtml {
            order: &order,
            orders_url: "https://shop.test/orders",
        }
        .render()
        .unwrap();

        assert!(html.contains("Oxford &#60;Shirt&#62;") || html.contains("Oxford &lt;Shirt&gt;"));
    }

    #[test]
    fn test_reset_url() {
        assert_eq!(
            reset_url("https://shop.test", "abc123"),
            "https://shop.test/reset-password?token=abc123"
        );
    }
}
