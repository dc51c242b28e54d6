use crate::core::email::display_value;
use crate::domain::model::FormSubmission;
use crate::domain::pages::ContactPage;
use crate::utils::error::{Result, SiteError};
use std::io::Write;
use std::path::Path;

pub const SUBMISSION_DATE_HEADER: &str = "Submission date";

/// Write submissions as CSV: one column per form field, in form order.
pub fn write_submissions_csv<W: Write>(
    writer: W,
    page: &ContactPage,
    submissions: &[FormSubmission],
) -> Result<()> {
    let fields = page.fields();
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![SUBMISSION_DATE_HEADER.to_string()];
    header.extend(fields.iter().map(|f| f.label.clone()));
    csv_writer.write_record(&header)?;

    for submission in submissions {
        let mut row = vec![submission.submit_time.format("%Y-%m-%d %H:%M:%S").to_string()];
        row.extend(fields.iter().map(|field| {
            submission
                .form_data
                .get(&field.key())
                .map(|value| display_value(field, value))
                .unwrap_or_default()
        }));
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn submissions_csv_string(page: &ContactPage, submissions: &[FormSubmission]) -> Result<String> {
    let mut buffer = Vec::new();
    write_submissions_csv(&mut buffer, page, submissions)?;
    String::from_utf8(buffer)
        .map_err(|e| SiteError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

pub fn export_submissions_csv<P: AsRef<Path>>(
    path: P,
    page: &ContactPage,
    submissions: &[FormSubmission],
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_submissions_csv(file, page, submissions)?;
    tracing::info!("📁 Exported {} submission(s) to {}", submissions.len(), path.display());
    Ok(())
}
