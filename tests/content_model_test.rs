use anyhow::Result;
use sitedemo::domain::blocks::{Block, ServiceBlock, SERVICE_TITLE_MAX_LENGTH};
use sitedemo::domain::model::ImageId;
use sitedemo::domain::pages::{ButtonLink, HomePage, Page, PageKind, ServicesPage};
use sitedemo::domain::panels::{content_panels, Panel};
use sitedemo::{Site, SiteError};
use tempfile::TempDir;

/// A content file written by hand, relying on editorial defaults for
/// every field it leaves out.
const CONTENT: &str = r#"
{
  "images": {
    "1": { "id": 1, "title": "Bureau", "file": "bureau.jpg", "width": 1920, "height": 1080,
           "created_at": "2025-01-01T00:00:00Z" },
    "2": { "id": 2, "title": "Équipe", "file": "equipe.jpg", "width": 1200, "height": 800,
           "created_at": "2025-01-01T00:00:00Z" }
  },
  "pages": {
    "1": {
      "meta": { "id": 1, "title": "Accueil", "slug": "accueil", "parent": null, "live": false,
                "has_unpublished_changes": true, "latest_revision": 1, "live_revision": null,
                "last_published_at": null },
      "draft": {
        "type": "home",
        "hero_background_image": 1,
        "hero_primary_button": { "label": "À propos", "page": 2 },
        "services_preview": [
          { "id": 1, "block": { "type": "service", "value": { "badge": "01", "title": "Sites vitrines", "image": 2,
                                                               "features": ["Responsive", "SEO"] } } },
          { "id": 2, "block": { "type": "service", "value": { "title": "Maintenance" } } }
        ]
      }
    },
    "2": {
      "meta": { "id": 2, "title": "À propos", "slug": "a-propos", "parent": 1, "live": false,
                "has_unpublished_changes": true, "latest_revision": 1, "live_revision": null,
                "last_published_at": null },
      "draft": { "type": "about", "image": 2, "image_caption": "Notre équipe" }
    }
  }
}
"#;

fn home(site: &Site) -> &HomePage {
    match &site.page(sitedemo::domain::model::PageId(1)).unwrap().draft {
        Page::Home(home) => home,
        other => panic!("expected home page, got {:?}", other.kind()),
    }
}

#[test]
fn test_content_file_loads_with_defaults() -> Result<()> {
    let site = Site::from_json_str(CONTENT)?;
    assert!(site.validate_all().is_empty());

    let home = home(&site);
    assert_eq!(home.hero_title, "Titre de la page d’accueil");
    assert_eq!(home.hero_secondary_button, ButtonLink::new("Discutons de votre projet"));
    assert_eq!(home.services_preview.len(), 2);
    Ok(())
}

#[test]
fn test_deleting_image_degrades_references_only() -> Result<()> {
    let mut site = Site::from_json_str(CONTENT)?;

    let report = site.delete_image(ImageId(2))?;
    // Service block illustration + about page image.
    assert_eq!(report.references_cleared, 2);
    assert_eq!(report.pages_deleted, 0);
    assert_eq!(site.pages().count(), 2);

    let report = site.delete_image(ImageId(1))?;
    assert_eq!(report.references_cleared, 1);
    assert!(home(&site).hero_background_image.is_none());

    // Captions and labels survive.
    assert!(matches!(
        &site.page(sitedemo::domain::model::PageId(2)).unwrap().draft,
        Page::About(about) if about.image.is_none() && about.image_caption == "Notre équipe"
    ));

    assert!(matches!(
        site.delete_image(ImageId(1)),
        Err(SiteError::ImageNotFound(1))
    ));
    Ok(())
}

#[test]
fn test_reordering_services_preserves_blocks() -> Result<()> {
    let mut site = Site::from_json_str(CONTENT)?;
    let before: Vec<ServiceBlock> = home(&site).services_preview.services().cloned().collect();

    site.update_draft(sitedemo::domain::model::PageId(1), |page| {
        if let Page::Home(home) = page {
            home.services_preview.move_block(1, 0);
        }
    })?;

    let after: Vec<ServiceBlock> = home(&site).services_preview.services().cloned().collect();
    assert_eq!(after, vec![before[1].clone(), before[0].clone()]);
    Ok(())
}

#[test]
fn test_service_title_limit_enforced_at_save() -> Result<()> {
    let mut site = Site::new();
    let services = site.create_page(None, PageKind::Services)?;

    let page = ServicesPage {
        services: vec![
            ServiceBlock::new("Conseil"),
            ServiceBlock::new("x".repeat(SERVICE_TITLE_MAX_LENGTH + 1)),
        ]
        .into_iter()
        .collect(),
        ..Default::default()
    };
    let err = site.save_draft(services, Page::Services(page)).unwrap_err();
    assert_eq!(err.field_errors()[0].field, "services[1].title");

    // The stored draft is still the default, empty stream.
    match &site.page(services).unwrap().draft {
        Page::Services(stored) => assert!(stored.services.is_empty()),
        other => panic!("unexpected {:?}", other.kind()),
    }
    Ok(())
}

#[test]
fn test_stream_blocks_are_tagged() -> Result<()> {
    let site = Site::from_json_str(CONTENT)?;
    let kinds: Vec<&str> = home(&site)
        .services_preview
        .iter()
        .map(|block| match block {
            Block::Service(_) => "service",
        })
        .collect();
    assert_eq!(kinds, vec!["service", "service"]);
    Ok(())
}

#[test]
fn test_save_and_reload_content_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("site.json");

    let mut site = Site::from_json_str(CONTENT)?;
    let gallery = site.create_page(Some(sitedemo::domain::model::PageId(1)), PageKind::Galerie)?;
    site.add_gallery_image(gallery, ImageId(1), "Le bureau")?;
    site.publish(gallery)?;
    site.save(&path)?;

    let reloaded = Site::load(&path)?;
    assert_eq!(reloaded.gallery(gallery).map(|g| g.image_count()), Some(1));
    assert!(reloaded.page(gallery).map(|n| n.meta.live).unwrap_or(false));
    Ok(())
}

#[test]
fn test_home_panels_expose_hero_group() {
    let panels = content_panels(PageKind::Home);
    let hero = panels
        .iter()
        .find_map(|p| match p {
            Panel::MultiField { heading, children } if heading.starts_with("Section hero") => {
                Some(children.len())
            }
            _ => None,
        });
    assert_eq!(hero, Some(8));
}
