use crate::domain::model::{EmailMessage, FormSubmission, NewSubmission, PageId};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Append-only log of contact form submissions.
pub trait SubmissionStore: Send + Sync {
    fn append(
        &self,
        submission: NewSubmission,
    ) -> impl std::future::Future<Output = Result<FormSubmission>> + Send;

    fn list(
        &self,
        page_id: PageId,
    ) -> impl std::future::Future<Output = Result<Vec<FormSubmission>>> + Send;
}

/// Outbound email delivery.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;

    fn name(&self) -> &'static str;
}

pub trait ConfigProvider: Send + Sync {
    fn site_name(&self) -> &str;
    fn is_production(&self) -> bool;
    fn content_path(&self) -> &str;
    fn submissions_path(&self) -> &str;
}
