//! Email service for claim notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Without SMTP
//! configuration the service runs in log-only mode: messages are rendered and
//! logged but never sent.

use askama::Template;
use chrono::{DateTime, Utc};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;

use foodbridge_core::{Item, Organization};

use crate::config::EmailConfig;

/// Characters of the text body included in log-only output.
const LOG_PREVIEW_CHARS: usize = 200;
const DATE_FORMAT: &str = "%B %d, %Y at %I:%M %p";

/// HTML template for the claimer's confirmation.
#[derive(Template)]
#[template(path = "email/claim_confirmed.html")]
struct ClaimConfirmedHtml<'a> {
    claimer_name: &'a str,
    item: &'a ItemDetails<'a>,
    org: &'a Organization,
    pickup: &'a [String],
}

/// Plain text template for the claimer's confirmation.
#[derive(Template)]
#[template(path = "email/claim_confirmed.txt")]
struct ClaimConfirmedText<'a> {
    claimer_name: &'a str,
    item: &'a ItemDetails<'a>,
    org: &'a Organization,
    pickup: &'a [String],
}

/// HTML template for the organization's new-claim notice.
#[derive(Template)]
#[template(path = "email/new_claim.html")]
struct NewClaimHtml<'a> {
    org_name: &'a str,
    item: &'a ItemDetails<'a>,
    claimed_on: &'a str,
    claimer: &'a Claimer<'a>,
}

/// Plain text template for the organization's new-claim notice.
#[derive(Template)]
#[template(path = "email/new_claim.txt")]
struct NewClaimText<'a> {
    org_name: &'a str,
    item: &'a ItemDetails<'a>,
    claimed_on: &'a str,
    claimer: &'a Claimer<'a>,
}

/// Item fields shown in emails, pre-formatted.
struct ItemDetails<'a> {
    title: &'a str,
    description: Option<&'a str>,
    quantity: Option<f64>,
    storage_type: Option<&'a str>,
    category: Option<&'a str>,
}

impl<'a> ItemDetails<'a> {
    fn new(item: &'a Item) -> Self {
        Self {
            title: &item.title,
            description: item.description.as_deref(),
            quantity: item.quantity,
            storage_type: item.storage_type.as_deref(),
            category: item.category.as_deref(),
        }
    }
}

/// Claimer contact details for the organization.
pub struct Claimer<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
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
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl EmailService {
    /// Create an email service that delivers over SMTP (STARTTLS).
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer: Some(mailer),
            from_address: config.from_address.clone(),
        })
    }

    /// Create an email service that only logs what it would send.
    #[must_use]
    pub fn log_only() -> Self {
        Self {
            mailer: None,
            from_address: "FoodBridge <noreply@localhost>".to_string(),
        }
    }

    /// Whether messages are actually delivered.
    #[must_use]
    pub const fn is_sending(&self) -> bool {
        self.mailer.is_some()
    }

    /// Confirm a claim to the person who claimed the item.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    #[instrument(skip_all, fields(item_id = %item.id))]
    pub async fn send_claim_confirmation(
        &self,
        to: &str,
        claimer_name: &str,
        item: &Item,
        org: &Organization,
    ) -> Result<(), EmailError> {
        let details = ItemDetails::new(item);
        let pickup = pickup_lines(item);
        let html = ClaimConfirmedHtml {
            claimer_name,
            item: &details,
            org,
            pickup: &pickup,
        }
        .render()?;
        let text = ClaimConfirmedText {
            claimer_name,
            item: &details,
            org,
            pickup: &pickup,
        }
        .render()?;

        let subject = format!("Food Claim Confirmed: {}", item.title);
        self.send_multipart_email(to, &subject, &text, &html).await
    }

    /// Tell the listing organization about a new claim.
    ///
    /// Returns `Ok(false)` without sending when the organization has no email.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    #[instrument(skip_all, fields(item_id = %item.id, org_id = %org.id))]
    pub async fn send_new_claim_notice(
        &self,
        item: &Item,
        org: &Organization,
        claimer: &Claimer<'_>,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool, EmailError> {
        let Some(to) = org.email.as_deref() else {
            tracing::warn!(org = %org.name, "No email configured for organization");
            return Ok(false);
        };

        let details = ItemDetails::new(item);
        let claimed_on = claimed_at.format(DATE_FORMAT).to_string();
        let html = NewClaimHtml {
            org_name: &org.name,
            item: &details,
            claimed_on: &claimed_on,
            claimer,
        }
        .render()?;
        let text = NewClaimText {
            org_name: &org.name,
            item: &details,
            claimed_on: &claimed_on,
            claimer,
        }
        .render()?;

        let subject = format!("New Claim for '{}' - Action Required", item.title);
        self.send_multipart_email(to, &subject, &text, &html).await?;
        Ok(true)
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let Some(mailer) = &self.mailer else {
            let preview: String = text_body.trim().chars().take(LOG_PREVIEW_CHARS).collect();
            tracing::info!(
                to = %to,
                subject = %subject,
                preview = %preview,
                "Email sending disabled; message logged only"
            );
            return Ok(());
        };

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

        mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Pickup schedule lines for an item.
fn pickup_lines(item: &Item) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(ready_at) = item.ready_at {
        lines.push(format!("Ready from: {}", ready_at.format(DATE_FORMAT)));
    }
    if let Some(expires_at) = item.expires_at {
        lines.push(format!("Must be picked up by: {}", expires_at.format(DATE_FORMAT)));
    }
    if let Some(window) = &item.pickup_window {
        lines.push(format!("Pickup window: {window}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use foodbridge_core::{ItemId, ItemStatus, OrganizationId};

    use super::*;

    fn item() -> Item {
        Item {
            id: ItemId::new(7),
            org_id: OrganizationId::new(2),
            title: "Rye loaves".to_string(),
            description: Some("Baked this morning".to_string()),
            category: Some("Bakery".to_string()),
            allergens: Vec::new(),
            storage_type: None,
            quantity: Some(6.0),
            ready_at: Some(Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).single().expect("valid time")),
            expires_at: None,
            pickup_window: Some("9am-noon".to_string()),
            status: ItemStatus::Claimed,
            photo_url: None,
            claimed_at: None,
            claimed_by_name: None,
            claimed_by_phone: None,
            claimed_by_email: None,
            claimed_by_user_id: None,
            donated_by_user_id: None,
        }
    }

    fn org(email: Option<&str>) -> Organization {
        Organization {
            id: OrganizationId::new(2),
            name: "Corner Bakery".to_string(),
            kind: "bakery".to_string(),
            address: Some("12 Main St".to_string()),
            lat: None,
            lng: None,
            phone: None,
            email: email.map(str::to_owned),
        }
    }

    #[test]
    fn test_pickup_lines() {
        assert_eq!(
            pickup_lines(&item()),
            vec![
                "Ready from: March 04, 2025 at 09:00 AM".to_string(),
                "Pickup window: 9am-noon".to_string(),
            ]
        );
    }

    #[test]
    fn test_confirmation_templates_render() {
        let item = item();
        let details = ItemDetails::new(&item);
        let org = org(None);
        let pickup = pickup_lines(&item);
        let text = ClaimConfirmedText {
            claimer_name: "Dana",
            item: &details,
            org: &org,
            pickup: &pickup,
        }
        .render()
        .expect("render");

        assert!(text.contains("Hi Dana,"));
        assert!(text.contains("Rye loaves"));
        assert!(text.contains("Address: 12 Main St"));
        assert!(text.contains("Pickup window: 9am-noon"));
        assert!(!text.contains("Phone:"));
    }

    #[test]
    fn test_new_claim_html_escapes_claimer_input() {
        let item = item();
        let details = ItemDetails::new(&item);
        let claimer = Claimer {
            name: "<b>Eve</b>",
            email: None,
            phone: Some("555-0100"),
        };
        let html = NewClaimHtml {
            org_name: "Corner Bakery",
            item: &details,
            claimed_on: "March 04, 2025 at 10:00 AM",
            claimer: &claimer,
        }
        .render()
        .expect("render");

        assert!(!html.contains("<b>Eve</b>"));
        assert!(html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(html.contains("No email provided"));
        assert!(html.contains("555-0100"));
    }

    #[tokio::test]
    async fn test_notice_skipped_without_org_email() {
        let service = EmailService::log_only();
        let claimer = Claimer {
            name: "Dana",
            email: None,
            phone: None,
        };
        let sent = service
            .send_new_claim_notice(&item(), &org(None), &claimer, Utc::now())
            .await
            .expect("no error");
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_log_only_mode_does_not_send() {
        let service = EmailService::log_only();
        assert!(!service.is_sending());
        service
            .send_claim_confirmation("dana@foodbridge.test", "Dana", &item(), &org(None))
            .await
            .expect("logged");

        let claimer = Claimer {
            name: "Dana",
            email: Some("dana@foodbridge.test"),
            phone: None,
        };
        let sent = service
            .send_new_claim_notice(&item(), &org(Some("bakery@foodbridge.test")), &claimer, Utc::now())
            .await
            .expect("logged");
        assert!(sent);
    }
}
