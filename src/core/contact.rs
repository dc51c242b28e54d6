use crate::core::email::compose_email;
use crate::domain::forms::{clean_form, FormData};
use crate::domain::model::{FormSubmission, NewSubmission, PageId};
use crate::domain::pages::ContactPage;
use crate::domain::ports::{MailTransport, SubmissionStore};
use crate::utils::error::{Result, SiteError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmailStatus {
    Sent,
    /// No recipient configured on the page.
    Skipped,
    /// The transport refused the message. The submission is still stored.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub submission: FormSubmission,
    pub email: EmailStatus,
    pub thank_you_text: String,
}

/// Validate, store and email contact form submissions.
pub struct ContactFormProcessor<S: SubmissionStore, M: MailTransport> {
    store: S,
    mail: M,
    production: bool,
}

impl<S: SubmissionStore, M: MailTransport> ContactFormProcessor<S, M> {
    pub fn new(store: S, mail: M) -> Self {
        Self {
            store,
            mail,
            production: false,
        }
    }

    pub fn in_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Log email routing still at its placeholder defaults, once, when a
    /// production processor is set up for `page`. Returns what was logged.
    pub fn report_routing(&self, page_id: PageId, page: &ContactPage) -> Vec<String> {
        if !self.production {
            return Vec::new();
        }
        let warnings = page.config_warnings();
        for warning in &warnings {
            tracing::warn!("⚠️ Contact page {}: {}", page_id, warning);
        }
        warnings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mail(&self) -> &M {
        &self.mail
    }

    pub async fn submit(
        &self,
        page_id: PageId,
        page: &ContactPage,
        data: &FormData,
    ) -> Result<SubmissionOutcome> {
        // 驗證表單
        let form_data = clean_form(&page.form_fields, data).map_err(|errors| {
            tracing::debug!(
                "Submission to page {} rejected: {} invalid field(s)",
                page_id,
                errors.len()
            );
            SiteError::FormInvalid { errors }
        })?;

        // 儲存提交記錄，與寄信結果無關
        let submission = self
            .store
            .append(NewSubmission {
                page_id,
                form_data,
            })
            .await?;
        tracing::info!("📝 Stored submission {} for page {}", submission.id, page_id);

        let email = self.dispatch(page, &submission).await;

        Ok(SubmissionOutcome {
            submission,
            email,
            thank_you_text: page.thank_you_text.clone(),
        })
    }

    async fn dispatch(&self, page: &ContactPage, submission: &FormSubmission) -> EmailStatus {
        let message = compose_email(page, &submission.form_data);
        if message.to.is_empty() {
            tracing::warn!(
                "⚠️ Page {} has no recipient; submission {} was not emailed",
                submission.page_id,
                submission.id
            );
            return EmailStatus::Skipped;
        }

        tracing::debug!(
            "Sending submission {} via {} to {}",
            submission.id,
            self.mail.name(),
            message.to.join(", ")
        );
        match self.mail.send(&message).await {
            Ok(()) => EmailStatus::Sent,
            Err(e) => {
                tracing::error!(
                    "❌ Email for submission {} failed: {} (Category: {:?}, Severity: {:?})",
                    submission.id,
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                EmailStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub async fn submissions(&self, page_id: PageId) -> Result<Vec<FormSubmission>> {
        self.store.list(page_id).await
    }
}
