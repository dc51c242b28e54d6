use clap::Parser;
use sitedemo::adapters::{transport_from_config, FileSubmissionStore};
use sitedemo::config::{CliArgs, Command};
use sitedemo::core::contact::{ContactFormProcessor, EmailStatus};
use sitedemo::core::export::export_submissions_csv;
use sitedemo::core::{ConfigProvider, SubmissionStore};
use sitedemo::domain::forms::FormData;
use sitedemo::domain::model::PageId;
use sitedemo::domain::pages::{ContactPage, Page};
use sitedemo::utils::error::ErrorSeverity;
use sitedemo::utils::{logger, validation::Validate};
use sitedemo::{Site, SiteConfig, SiteError};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting sitedemo");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 載入配置：檔案不存在時使用預設值
    let config = if Path::new(&args.config).exists() {
        match SiteConfig::from_file(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        }
    } else {
        tracing::warn!("⚠️ Config file '{}' not found, using defaults", args.config);
        SiteConfig::default()
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!(
        "🌐 {} ({})",
        config.site_name(),
        if config.is_production() { "production" } else { "development" }
    );

    let content_path = args
        .content
        .clone()
        .unwrap_or_else(|| config.content_path().to_string());

    let result = match &args.command {
        Command::Check => run_check(&config, &content_path),
        Command::Submit { page, fields } => {
            run_submit(&config, &content_path, PageId(*page), fields).await
        }
        Command::Export { page, output } => {
            run_export(&config, &content_path, PageId(*page), output).await
        }
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        for field_error in e.field_errors() {
            eprintln!("   • {}", field_error);
        }
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 2,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

fn run_check(config: &SiteConfig, content_path: &str) -> sitedemo::Result<()> {
    let site = Site::load(content_path)?;
    tracing::info!(
        "📁 Loaded {} page(s) and {} image(s) from {}",
        site.pages().count(),
        site.images().count(),
        content_path
    );

    let problems = site.validate_all();
    for (page_id, errors) in &problems {
        for error in errors {
            println!("❌ page {}: {}", page_id, error);
        }
    }

    for node in site.pages() {
        if let Some(contact) = node.draft.as_contact() {
            for warning in contact.config_warnings() {
                if config.is_production() {
                    tracing::warn!("⚠️ Contact page {}: {}", node.meta.id, warning);
                } else {
                    tracing::info!("Contact page {}: {}", node.meta.id, warning);
                }
            }
        }
    }

    if problems.is_empty() {
        println!("✅ All pages are valid");
        Ok(())
    } else {
        Err(SiteError::SchemaInvalid {
            entity: format!("{} page(s)", problems.len()),
            errors: problems.into_iter().flat_map(|(_, errors)| errors).collect(),
        })
    }
}

/// The version visitors see, or the draft if the page was never published.
fn contact_page(site: &Site, page_id: PageId) -> sitedemo::Result<ContactPage> {
    let node = site.page(page_id).ok_or(SiteError::PageNotFound(page_id.0))?;
    let page = match &node.live {
        Some(live) => live,
        None => {
            tracing::warn!("⚠️ Page {} is not published, using its draft", page_id);
            &node.draft
        }
    };
    match page {
        Page::Contact(contact) => Ok(contact.clone()),
        other => Err(SiteError::tree(format!(
            "page {} is a {}, not a ContactPage",
            page_id,
            other.kind().type_name()
        ))),
    }
}

async fn run_submit(
    config: &SiteConfig,
    content_path: &str,
    page_id: PageId,
    fields: &[(String, String)],
) -> sitedemo::Result<()> {
    let site = Site::load(content_path)?;
    let page = contact_page(&site, page_id)?;

    let store = FileSubmissionStore::new(config.submissions_path());
    let transport = transport_from_config(&config.email)?;
    let processor = ContactFormProcessor::new(store, transport).in_production(config.is_production());
    processor.report_routing(page_id, &page);

    let data: FormData = fields.iter().cloned().collect();
    let outcome = processor.submit(page_id, &page, &data).await?;

    println!("✅ Submission {} recorded", outcome.submission.id);
    match &outcome.email {
        EmailStatus::Sent => println!("📧 Email sent to {}", page.to_address),
        EmailStatus::Skipped => println!("⚠️ No recipient configured, email skipped"),
        EmailStatus::Failed { reason } => println!("⚠️ Email failed: {}", reason),
    }
    println!("{}", outcome.thank_you_text);
    Ok(())
}

async fn run_export(
    config: &SiteConfig,
    content_path: &str,
    page_id: PageId,
    output: &str,
) -> sitedemo::Result<()> {
    let site = Site::load(content_path)?;
    let page = contact_page(&site, page_id)?;

    let store = FileSubmissionStore::new(config.submissions_path());
    let submissions = store.list(page_id).await?;
    export_submissions_csv(output, &page, &submissions)?;

    println!("📁 Exported {} submission(s) to {}", submissions.len(), output);
    Ok(())
}
