use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{app::App, emails::send_text_email};

use super::{execution_context::JobExecutionContext, Job, JobError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailArguments {
    pub to_email: String,
    pub subject: String,
    pub message: String,
}

/// Sends a plain-text email built from the `toEmail`, `subject` and `message` payload keys.
pub struct SendEmail;

impl Job for SendEmail {
    type Arguments = SendEmailArguments;

    async fn execute(
        app: &App,
        context: &JobExecutionContext,
        arguments: Self::Arguments,
    ) -> Result<(), JobError> {
        Self::log(context);

        info!("Preparing to send email to: {}", arguments.to_email);
        send_text_email(app, &arguments.to_email, &arguments.subject, arguments.message).await?;
        info!("Completed sending email.");

        Ok(())
    }

    fn name() -> &'static str {
        "send_email"
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use serde_json::json;

    use super::*;
    use crate::{
        engine::{JobBuilder, JobKey, Trigger, TriggerKey},
        jobs::{job_registry::JobRegistry, job_result::JobResult},
        tests::setup_test::test_app,
    };

    fn context(data: serde_json::Value) -> JobExecutionContext {
        let job = JobBuilder::new(SendEmail::name())
            .with_identity(JobKey::new("mailTo:a@x.com", "email"))
            .with_description(Some("Schedule send email.".to_string()))
            .using_job_data(data.as_object().cloned().unwrap())
            .store_durably(true)
            .build();
        let trigger = Trigger::once(
            TriggerKey::new("mailTo:a@x.com", "email"),
            job.key.clone(),
            Local::now(),
            Default::default(),
        );
        JobExecutionContext::new(&job, &trigger, Local::now(), Local::now())
    }

    #[tokio::test]
    async fn test_sends_email_through_mailer() {
        let app = test_app();
        let registry = JobRegistry::new().with_job::<SendEmail>();

        let result = registry
            .execute(
                &app,
                context(json!({
                    "toEmail": "a@x.com",
                    "subject": "Hello",
                    "message": "Body text"
                })),
            )
            .await;

        assert!(result.is_completed());
        let messages = app.mailer.messages().unwrap();
        assert_eq!(messages.len(), 1);
        let envelope = messages[0].envelope();
        assert_eq!(envelope.to()[0].to_string(), "a@x.com");
        let raw = String::from_utf8(messages[0].formatted()).unwrap();
        assert!(raw.contains("Subject: Hello"));
        assert!(raw.contains("Body text"));
    }

    #[tokio::test]
    async fn test_missing_payload_key_is_invalid_payload() {
        let app = test_app();
        let registry = JobRegistry::new().with_job::<SendEmail>();

        let result = registry
            .execute(&app, context(json!({ "toEmail": "a@x.com" })))
            .await;

        assert!(matches!(
            result,
            JobResult::Failed(JobError::InvalidPayload(_))
        ));
        assert!(app.mailer.messages().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_invalid_payload() {
        let app = test_app();
        let registry = JobRegistry::new().with_job::<SendEmail>();

        let result = registry
            .execute(
                &app,
                context(json!({
                    "toEmail": "not an address",
                    "subject": "Hello",
                    "message": "Body"
                })),
            )
            .await;

        assert!(matches!(
            result,
            JobResult::Failed(JobError::InvalidPayload(_))
        ));
    }
}
