pub mod contact;
pub mod email;
pub mod export;
pub mod site;

pub use crate::domain::model::{EmailMessage, FormSubmission, NewSubmission};
pub use crate::domain::ports::{ConfigProvider, MailTransport, SubmissionStore};
pub use crate::utils::error::Result;
