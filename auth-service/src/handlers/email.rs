use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use log::debug;
use std::env;
use tokio::sync::OnceCell;

use volunteers_shared::error::{AppError, Result};

static SES_CLIENT: OnceCell<SesClient> = OnceCell::const_new();
static SENDER_ADDRESS: OnceCell<String> = OnceCell::const_new();

/// Sends the verification-code email via SES. Callers treat failures as
/// non-fatal; the code is already persisted when this runs.
pub async fn send_verification_email(email: &str, validation_code: &str) -> Result<()> {
    // Check if we're in test mode
    if let Ok(test_email) = env::var("TEST_EMAIL") {
        if test_email == "true" {
            debug!("Test mode: Skipping verification email send");
            return Ok(());
        }
    }

    let client = SES_CLIENT
        .get_or_init(|| async {
            let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .load()
                .await;
            SesClient::new(&config)
        })
        .await
        .clone();

    let sender = SENDER_ADDRESS
        .get_or_try_init(|| async {
            env::var("SENDER_EMAIL").map_err(|_| {
                AppError::internal_server_error("SENDER_EMAIL environment variable not set".into())
            })
        })
        .await?;

    let subject = content("Your volunteer dashboard verification code")?;
    let text_body = content(&format!(
        "Hello!\n\n\
         You requested access to your volunteer dashboard. Use the verification \
         code below to complete your login:\n\n\
         Verification code: {}\n\n\
         This code will expire in 15 minutes.\n\n\
         If you didn't request this code, you can safely ignore this email. \
         Never share this code with anyone; we will never ask you for it.",
        validation_code
    ))?;

    client
        .send_email()
        .from_email_address(sender)
        .destination(Destination::builder().to_addresses(email).build())
        .content(
            EmailContent::builder()
                .simple(
                    Message::builder()
                        .subject(subject)
                        .body(Body::builder().text(text_body).build())
                        .build(),
                )
                .build(),
        )
        .send()
        .await
        .map_err(|e| {
            AppError::internal_server_error(format!("Failed to send email via SES: {:?}", e))
        })?;

    debug!("Verification email accepted by SES");
    Ok(())
}

fn content(data: &str) -> Result<Content> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| AppError::internal_server_error(format!("Failed to build email content: {}", e)))
}
