use crate::config::EmailConfig;
use crate::errors::{ServiceError, ServiceResult};
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;

pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new EmailService instance
    pub fn new(config: EmailConfig) -> ServiceResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| ServiceError::validation(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, config })
    }

    /// Sends a password reset code to the specified recipient
    pub async fn send_password_reset_email(
        &self,
        recipient_email: &str,
        recipient_name: &str,
        code: u32,
    ) -> ServiceResult<()> {
        let subject = "Your password reset code";

        let html_content = self.build_reset_html(recipient_name, code);
        let text_content = self.build_reset_text(recipient_name, code);

        self.send_email(recipient_email, subject, &html_content, &text_content)
            .await
    }

    /// Sends a generic email
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> ServiceResult<()> {
        let from_mailbox = Mailbox::from_str(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_email
        ))
        .map_err(|e| ServiceError::validation(format!("Invalid from email: {e}")))?;

        let to_mailbox = Mailbox::from_str(to_email)
            .map_err(|e| ServiceError::validation(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_content.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_content.to_string()),
                    ),
            )
            .map_err(|e| ServiceError::validation(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| ServiceError::external_service(format!("Failed to send email: {e}")))?;

        Ok(())
    }

    fn build_reset_html(&self, recipient_name: &str, code: u32) -> String {
        format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <meta charset="UTF-8">
                <title>Password reset code</title>
            </head>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #2c3e50;">Password reset requested</h2>

                    <p>Hi {},</p>

                    <p>Use the code below to reset your password:</p>

                    <div style="text-align: center; margin: 30px 0;">
                        <span style="font-size: 32px; letter-spacing: 8px; font-weight: bold;">{}</span>
                    </div>

                    <hr style="border: none; border-top: 1px solid #ecf0f1; margin: 30px 0;">

                    <p style="font-size: 12px; color: #7f8c8d;">
                        This code expires in 5 minutes. If you didn't request a password reset,
                        you can safely ignore this email.
                    </p>
                </div>
            </body>
            </html>
            "#,
            recipient_name, code
        )
    }

    fn build_reset_text(&self, recipient_name: &str, code: u32) -> String {
        format!(
            r#"Password reset requested

Hi {},

Use the code below to reset your password:

{}

This code expires in 5 minutes. If you didn't request a password reset, you can safely ignore this email.
            "#,
            recipient_name, code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> EmailService {
        EmailService::new(EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "user".to_string(),
            smtp_password: "pass".to_string(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Gatehouse".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_reset_bodies_carry_code_and_expiry() {
        let service = test_service();

        let text = service.build_reset_text("A", 123_456);
        assert!(text.contains("123456"));
        assert!(text.contains("5 minutes"));

        let html = service.build_reset_html("A", 123_456);
        assert!(html.contains("123456"));
        assert!(html.contains("5 minutes"));
    }
}
