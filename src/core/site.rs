//! In-process page tree and image library.
//!
//! Stands in for the CMS engine just far enough to enforce the data-model
//! rules that belong to this site: save-time validation, atomic publish,
//! soft references that null themselves and owned rows that cascade.

use crate::domain::model::{slugify, Image, ImageId, PageId, PageMeta};
use crate::domain::pages::{GaleriePage, Page, PageKind};
use crate::domain::relations::{self, DeleteEffect, Target};
use crate::utils::error::{FieldError, Result, SiteError};
use crate::utils::validation::check_char_field;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub const PAGE_TITLE_MAX_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    pub meta: PageMeta,
    /// Latest saved revision, what editors see.
    pub draft: Page,
    /// Published revision, what visitors see.
    #[serde(default)]
    pub live: Option<Page>,
}

/// What a deletion removed or degraded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub pages_deleted: usize,
    pub images_deleted: usize,
    /// Gallery entries and form fields deleted with their owner.
    pub owned_rows_deleted: usize,
    /// Soft references set to null on surviving pages.
    pub references_cleared: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default)]
    pages: BTreeMap<PageId, PageNode>,
    #[serde(default)]
    images: BTreeMap<ImageId, Image>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 檔案載入網站內容
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    /// Parse a content file. A tree with dangling parents, loops or
    /// mismatched ids is rejected; page content problems are left to
    /// `validate_all`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let site: Site = serde_json::from_str(content)?;
        let problems = site.tree_problems();
        if !problems.is_empty() {
            for (page_id, error) in &problems {
                tracing::error!("❌ Broken page tree at page {}: {}", page_id, error);
            }
            return Err(SiteError::SchemaInvalid {
                entity: "page tree".to_string(),
                errors: problems
                    .into_iter()
                    .map(|(page_id, error)| error.nested(&format!("pages[{}]", page_id)))
                    .collect(),
            });
        }
        Ok(site)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    // ------------------------------------------------------------ images

    pub fn add_image(
        &mut self,
        title: impl Into<String>,
        file: impl Into<String>,
        width: u32,
        height: u32,
    ) -> ImageId {
        let id = ImageId(self.images.keys().last().map_or(1, |id| id.0 + 1));
        self.images.insert(
            id,
            Image {
                id,
                title: title.into(),
                file: file.into(),
                width,
                height,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn image(&self, id: ImageId) -> Option<&Image> {
        self.images.get(&id)
    }

    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.images.values()
    }

    /// Delete an image. Soft references on pages are nulled; gallery entries
    /// showing the image are deleted with it.
    pub fn delete_image(&mut self, id: ImageId) -> Result<DeletionReport> {
        if !self.images.contains_key(&id) {
            return Err(SiteError::ImageNotFound(id.0));
        }

        let mut report = DeletionReport {
            images_deleted: 1,
            ..Default::default()
        };
        let mut doomed_holders = Vec::new();
        for (page_id, node) in self.pages.iter_mut() {
            let mut effect = DeleteEffect::default();
            for page in revisions_mut(node) {
                for relation in relations::relations_to(Target::Image) {
                    effect.merge(page.apply_image_deletion(relation, id));
                }
            }
            report.references_cleared += effect.cleared;
            report.owned_rows_deleted += effect.rows_deleted;
            if effect.delete_holder {
                doomed_holders.push(*page_id);
            }
        }
        self.images.remove(&id);

        for page_id in doomed_holders {
            if self.pages.contains_key(&page_id) {
                let cascaded = self.delete_page(page_id)?;
                report.pages_deleted += cascaded.pages_deleted;
                report.owned_rows_deleted += cascaded.owned_rows_deleted;
                report.references_cleared += cascaded.references_cleared;
            }
        }

        tracing::info!(
            "🗑️ Deleted image {} ({} references cleared, {} owned rows removed)",
            id,
            report.references_cleared,
            report.owned_rows_deleted
        );
        Ok(report)
    }

    // ------------------------------------------------------------- pages

    pub fn page(&self, id: PageId) -> Option<&PageNode> {
        self.pages.get(&id)
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageNode> {
        self.pages.values()
    }

    fn node_mut(&mut self, id: PageId) -> Result<&mut PageNode> {
        self.pages.get_mut(&id).ok_or(SiteError::PageNotFound(id.0))
    }

    pub fn children(&self, parent: PageId) -> Vec<PageId> {
        self.pages
            .values()
            .filter(|node| node.meta.parent == Some(parent))
            .map(|node| node.meta.id)
            .collect()
    }

    /// Create a page with every field at its default.
    pub fn create_page(&mut self, parent: Option<PageId>, kind: PageKind) -> Result<PageId> {
        self.create_page_with(parent, kind.default_title(), Page::new(kind))
    }

    /// Create a page from editor input. Nothing is stored if it is invalid.
    pub fn create_page_with(
        &mut self,
        parent: Option<PageId>,
        title: &str,
        page: Page,
    ) -> Result<PageId> {
        if let Some(parent) = parent {
            if !self.pages.contains_key(&parent) {
                return Err(SiteError::PageNotFound(parent.0));
            }
        }

        let mut errors = Vec::new();
        check_char_field(&mut errors, "title", title, Some(PAGE_TITLE_MAX_LENGTH), true);
        errors.extend(self.check_page(&page));
        if !errors.is_empty() {
            return Err(SiteError::SchemaInvalid {
                entity: page.kind().type_name().to_string(),
                errors,
            });
        }

        let id = PageId(self.pages.keys().last().map_or(1, |id| id.0 + 1));
        let slug = self.unique_slug(parent, &slugify(title), None);
        tracing::debug!("Creating {} {} at /{}", page.kind().type_name(), id, slug);

        self.pages.insert(
            id,
            PageNode {
                meta: PageMeta {
                    id,
                    title: title.to_string(),
                    slug,
                    parent,
                    live: false,
                    has_unpublished_changes: true,
                    latest_revision: 1,
                    live_revision: None,
                    last_published_at: None,
                },
                draft: page,
                live: None,
            },
        );
        Ok(id)
    }

    fn unique_slug(&self, parent: Option<PageId>, base: &str, exclude: Option<PageId>) -> String {
        let base = if base.is_empty() { "page" } else { base };
        let taken = |slug: &str| {
            self.pages.values().any(|node| {
                node.meta.parent == parent && Some(node.meta.id) != exclude && node.meta.slug == slug
            })
        };
        if !taken(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Schema checks plus reference checks against this site's content.
    fn check_page(&self, page: &Page) -> Vec<FieldError> {
        let mut errors = page.validate();
        for (field, image) in page.image_refs() {
            if !self.images.contains_key(&image) {
                errors.push(FieldError::new(field, format!("Image {} does not exist.", image)));
            }
        }
        for (field, target) in page.page_refs() {
            if !self.pages.contains_key(&target) {
                errors.push(FieldError::new(field, format!("Page {} does not exist.", target)));
            }
        }
        errors
    }

    /// Save a new draft revision. The previous draft is kept if the new one
    /// is invalid.
    pub fn save_draft(&mut self, id: PageId, page: Page) -> Result<u32> {
        let current_kind = self
            .pages
            .get(&id)
            .ok_or(SiteError::PageNotFound(id.0))?
            .draft
            .kind();
        if current_kind != page.kind() {
            return Err(SiteError::tree(format!(
                "page {} is a {}, not a {}",
                id,
                current_kind.type_name(),
                page.kind().type_name()
            )));
        }

        let errors = self.check_page(&page);
        if !errors.is_empty() {
            return Err(SiteError::SchemaInvalid {
                entity: page.kind().type_name().to_string(),
                errors,
            });
        }

        let node = self.node_mut(id)?;
        node.draft = page;
        node.meta.latest_revision += 1;
        node.meta.has_unpublished_changes = true;
        Ok(node.meta.latest_revision)
    }

    /// Edit a copy of the draft and save it if the result is valid.
    pub fn update_draft<F>(&mut self, id: PageId, edit: F) -> Result<u32>
    where
        F: FnOnce(&mut Page),
    {
        let mut page = self
            .pages
            .get(&id)
            .ok_or(SiteError::PageNotFound(id.0))?
            .draft
            .clone();
        edit(&mut page);
        self.save_draft(id, page)
    }

    pub fn rename_page(&mut self, id: PageId, title: &str) -> Result<()> {
        let mut errors = Vec::new();
        check_char_field(&mut errors, "title", title, Some(PAGE_TITLE_MAX_LENGTH), true);
        let node = self.pages.get(&id).ok_or(SiteError::PageNotFound(id.0))?;
        if !errors.is_empty() {
            return Err(SiteError::SchemaInvalid {
                entity: node.draft.kind().type_name().to_string(),
                errors,
            });
        }
        let slug = self.unique_slug(node.meta.parent, &slugify(title), Some(id));
        let node = self.node_mut(id)?;
        node.meta.title = title.to_string();
        node.meta.slug = slug;
        Ok(())
    }

    /// Append an image to a gallery's draft.
    pub fn add_gallery_image(
        &mut self,
        page: PageId,
        image: ImageId,
        caption: &str,
    ) -> Result<u32> {
        if !self.images.contains_key(&image) {
            return Err(SiteError::ImageNotFound(image.0));
        }
        let node = self.pages.get(&page).ok_or(SiteError::PageNotFound(page.0))?;
        if node.draft.kind() != PageKind::Galerie {
            return Err(SiteError::tree(format!("page {} is not a gallery", page)));
        }
        let mut entry_id = None;
        self.update_draft(page, |draft| {
            if let Page::Galerie(gallery) = draft {
                entry_id = Some(gallery.add_image(image, caption));
            }
        })?;
        entry_id.ok_or_else(|| SiteError::tree(format!("page {} is not a gallery", page)))
    }

    pub fn gallery(&self, page: PageId) -> Option<&GaleriePage> {
        self.pages.get(&page).and_then(|node| node.draft.as_galerie())
    }

    /// Make the current draft live. Either the whole draft goes live or
    /// nothing changes.
    pub fn publish(&mut self, id: PageId) -> Result<u32> {
        let node = self.pages.get(&id).ok_or(SiteError::PageNotFound(id.0))?;
        let errors = self.check_page(&node.draft);
        if !errors.is_empty() {
            return Err(SiteError::SchemaInvalid {
                entity: node.draft.kind().type_name().to_string(),
                errors,
            });
        }

        let node = self.node_mut(id)?;
        node.live = Some(node.draft.clone());
        node.meta.live = true;
        node.meta.has_unpublished_changes = false;
        node.meta.live_revision = Some(node.meta.latest_revision);
        node.meta.last_published_at = Some(Utc::now());
        tracing::info!(
            "📢 Published {} \"{}\" (revision {})",
            node.draft.kind().type_name(),
            node.meta.title,
            node.meta.latest_revision
        );
        Ok(node.meta.latest_revision)
    }

    pub fn unpublish(&mut self, id: PageId) -> Result<()> {
        let node = self.node_mut(id)?;
        node.live = None;
        node.meta.live = false;
        node.meta.live_revision = None;
        node.meta.has_unpublished_changes = true;
        Ok(())
    }

    /// Delete a page and its descendants. Owned rows go with them; links
    /// to them from surviving pages are nulled.
    pub fn delete_page(&mut self, id: PageId) -> Result<DeletionReport> {
        if !self.pages.contains_key(&id) {
            return Err(SiteError::PageNotFound(id.0));
        }

        let mut report = DeletionReport::default();
        let mut seen = HashSet::new();
        let mut queue = vec![id];
        while let Some(root) = queue.pop() {
            let doomed = self.subtree(root, &mut seen);
            for page_id in &doomed {
                if let Some(node) = self.pages.remove(page_id) {
                    report.pages_deleted += 1;
                    report.owned_rows_deleted += node.draft.owned_rows();
                }
            }

            for (page_id, node) in self.pages.iter_mut() {
                let mut effect = DeleteEffect::default();
                for page in revisions_mut(node) {
                    for relation in relations::relations_to(Target::Page) {
                        for target in &doomed {
                            effect.merge(page.apply_page_deletion(relation, *target));
                        }
                    }
                }
                report.references_cleared += effect.cleared;
                report.owned_rows_deleted += effect.rows_deleted;
                if effect.delete_holder && !seen.contains(page_id) {
                    queue.push(*page_id);
                }
            }
        }

        tracing::info!(
            "🗑️ Deleted {} page(s) ({} owned rows, {} links cleared)",
            report.pages_deleted,
            report.owned_rows_deleted,
            report.references_cleared
        );
        Ok(report)
    }

    /// `root` and every page below it not already in `seen`, parents first.
    fn subtree(&self, root: PageId, seen: &mut HashSet<PageId>) -> Vec<PageId> {
        if !seen.insert(root) {
            return Vec::new();
        }
        let mut pages = vec![root];
        let mut cursor = 0;
        while cursor < pages.len() {
            for child in self.children(pages[cursor]) {
                if seen.insert(child) {
                    pages.push(child);
                }
            }
            cursor += 1;
        }
        pages
    }

    /// Structural problems of the tree itself: ids that disagree with their
    /// key, parents that do not exist and parent chains that loop.
    fn tree_problems(&self) -> Vec<(PageId, FieldError)> {
        let mut problems = Vec::new();
        for (key, node) in &self.pages {
            if node.meta.id != *key {
                problems.push((
                    *key,
                    FieldError::new("id", format!("Stored as page {} but has id {}.", key, node.meta.id)),
                ));
            }
            if let Some(parent) = node.meta.parent {
                if !self.pages.contains_key(&parent) {
                    problems.push((
                        *key,
                        FieldError::new("parent", format!("Page {} does not exist.", parent)),
                    ));
                    continue;
                }
            }

            let mut ancestors = HashSet::from([*key]);
            let mut cursor = node.meta.parent;
            while let Some(ancestor) = cursor {
                if !ancestors.insert(ancestor) {
                    problems.push((
                        *key,
                        FieldError::new("parent", format!("Parent chain loops through page {}.", ancestor)),
                    ));
                    break;
                }
                cursor = self.pages.get(&ancestor).and_then(|n| n.meta.parent);
            }
        }
        problems
    }

    /// Validation problems for every draft and for the tree, for the
    /// `check` command.
    pub fn validate_all(&self) -> Vec<(PageId, Vec<FieldError>)> {
        let mut problems: BTreeMap<PageId, Vec<FieldError>> = BTreeMap::new();
        for (page_id, error) in self.tree_problems() {
            problems.entry(page_id).or_default().push(error);
        }
        for (page_id, node) in &self.pages {
            let errors = self.check_page(&node.draft);
            if !errors.is_empty() {
                problems.entry(*page_id).or_default().extend(errors);
            }
        }
        problems.into_iter().collect()
    }
}

fn revisions_mut(node: &mut PageNode) -> impl Iterator<Item = &mut Page> {
    std::iter::once(&mut node.draft).chain(node.live.as_mut())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::blocks::ServiceBlock;
    use crate::domain::pages::{AboutPage, ButtonLink, HomePage};

    fn site_with_home() -> (Site, PageId) {
        let mut site = Site::new();
        let home = site.create_page(None, PageKind::Home).unwrap();
        (site, home)
    }

    #[test]
    fn test_create_every_kind_with_defaults_and_publish() {
        let (mut site, home) = site_with_home();
        for kind in [
            PageKind::Services,
            PageKind::About,
            PageKind::Galerie,
            PageKind::Contact,
        ] {
            let id = site.create_page(Some(home), kind).unwrap();
            assert_eq!(site.publish(id).unwrap(), 1);
            assert!(site.page(id).unwrap().meta.live);
        }
        assert_eq!(site.children(home).len(), 4);
    }

    #[test]
    fn test_invalid_page_is_not_persisted() {
        let mut site = Site::new();
        let home = HomePage {
            hero_title: String::new(),
            ..Default::default()
        };
        let err = site
            .create_page_with(None, "Accueil", Page::Home(home))
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "hero_title");
        assert_eq!(site.pages().count(), 0);
    }

    #[test]
    fn test_slugs_unique_among_siblings() {
        let (mut site, home) = site_with_home();
        let a = site.create_page(Some(home), PageKind::Services).unwrap();
        let b = site.create_page(Some(home), PageKind::Services).unwrap();
        assert_eq!(site.page(a).unwrap().meta.slug, "nos-services");
        assert_eq!(site.page(b).unwrap().meta.slug, "nos-services-2");

        site.rename_page(b, "Tarifs").unwrap();
        assert_eq!(site.page(b).unwrap().meta.slug, "tarifs");
    }

    #[test]
    fn test_failed_publish_leaves_live_untouched() {
        let (mut site, home) = site_with_home();
        site.publish(home).unwrap();
        let live_before = site.page(home).unwrap().live.clone();

        // Sneak an invalid draft in by editing the node directly, as an
        // import of a hand-written content file could.
        if let Some(node) = site.pages.get_mut(&home) {
            if let Page::Home(draft) = &mut node.draft {
                draft.hero_title = "x".repeat(500);
            }
        }
        assert!(site.publish(home).is_err());
        assert_eq!(site.page(home).unwrap().live, live_before);
    }

    #[test]
    fn test_save_draft_rejects_unknown_image() {
        let (mut site, home) = site_with_home();
        let err = site
            .update_draft(home, |page| {
                if let Page::Home(h) = page {
                    h.hero_background_image = Some(ImageId(99));
                }
            })
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "hero_background_image");
    }

    #[test]
    fn test_delete_image_nulls_soft_references() {
        let (mut site, home) = site_with_home();
        let hero = site.add_image("Hero", "hero.jpg", 1920, 1080);
        let about = site
            .create_page_with(
                Some(home),
                "À propos",
                Page::About(AboutPage {
                    image: Some(hero),
                    image_caption: "L'équipe".to_string(),
                    ..Default::default()
                }),
            )
            .unwrap();
        site.update_draft(home, |page| {
            if let Page::Home(h) = page {
                h.hero_background_image = Some(hero);
                h.services_preview.push(ServiceBlock::new("Site").with_image(hero));
            }
        })
        .unwrap();
        site.publish(home).unwrap();

        let report = site.delete_image(hero).unwrap();
        // Draft and live home (background + block) plus the about draft.
        assert_eq!(report.references_cleared, 5);
        assert!(site.image(hero).is_none());

        match &site.page(home).unwrap().draft {
            Page::Home(h) => {
                assert!(h.hero_background_image.is_none());
                assert!(h.services_preview.services().all(|s| s.image.is_none()));
            }
            _ => unreachable!(),
        }
        match &site.page(about).unwrap().draft {
            Page::About(a) => {
                assert!(a.image.is_none());
                assert_eq!(a.image_caption, "L'équipe");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_delete_image_cascades_gallery_entries() {
        let (mut site, home) = site_with_home();
        let gallery = site.create_page(Some(home), PageKind::Galerie).unwrap();
        let one = site.add_image("Un", "1.jpg", 800, 600);
        let two = site.add_image("Deux", "2.jpg", 800, 600);
        site.add_gallery_image(gallery, one, "Un").unwrap();
        site.add_gallery_image(gallery, two, "Deux").unwrap();

        let report = site.delete_image(one).unwrap();
        assert_eq!(report.owned_rows_deleted, 1);
        let remaining: Vec<ImageId> = site
            .gallery(gallery)
            .unwrap()
            .images()
            .iter()
            .map(|e| e.image)
            .collect();
        assert_eq!(remaining, vec![two]);
    }

    #[test]
    fn test_add_gallery_image_checks_targets() {
        let (mut site, home) = site_with_home();
        let image = site.add_image("Un", "1.jpg", 800, 600);
        assert!(matches!(
            site.add_gallery_image(home, ImageId(42), ""),
            Err(SiteError::ImageNotFound(42))
        ));
        assert!(matches!(
            site.add_gallery_image(home, image, ""),
            Err(SiteError::TreeError { .. })
        ));
    }

    #[test]
    fn test_delete_gallery_page_cascades_children() {
        let (mut site, home) = site_with_home();
        let gallery = site.create_page(Some(home), PageKind::Galerie).unwrap();
        for n in 0..3 {
            let image = site.add_image(format!("Photo {}", n), format!("{}.jpg", n), 800, 600);
            site.add_gallery_image(gallery, image, "").unwrap();
        }

        let report = site.delete_page(gallery).unwrap();
        assert_eq!(report.pages_deleted, 1);
        assert_eq!(report.owned_rows_deleted, 3);
        assert!(site.gallery(gallery).is_none());
        // The images themselves stay in the library.
        assert_eq!(site.images().count(), 3);
    }

    #[test]
    fn test_delete_page_nulls_button_targets_and_removes_subtree() {
        let (mut site, home) = site_with_home();
        let about = site.create_page(Some(home), PageKind::About).unwrap();
        let nested = site.create_page(Some(about), PageKind::Galerie).unwrap();
        site.update_draft(home, |page| {
            if let Page::Home(h) = page {
                h.hero_primary_button = ButtonLink::new("À propos").to_page(about);
                h.hero_secondary_button = ButtonLink::new("Galerie").to_page(nested);
            }
        })
        .unwrap();

        let report = site.delete_page(about).unwrap();
        assert_eq!(report.pages_deleted, 2);
        assert_eq!(report.references_cleared, 2);

        match &site.page(home).unwrap().draft {
            Page::Home(h) => {
                assert_eq!(h.hero_primary_button.label, "À propos");
                assert!(h.hero_primary_button.page.is_none());
                assert!(h.hero_secondary_button.page.is_none());
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("content/site.json");
        let (mut site, home) = site_with_home();
        site.publish(home).unwrap();
        site.save(&path).unwrap();

        let loaded = Site::load(&path).unwrap();
        assert_eq!(loaded, site);
    }

    fn node(id: u64, parent: Option<u64>) -> serde_json::Value {
        serde_json::json!({
            "meta": { "id": id, "title": "Page", "slug": format!("page-{}", id),
                      "parent": parent, "live": false, "has_unpublished_changes": true,
                      "latest_revision": 1, "live_revision": null, "last_published_at": null },
            "draft": { "type": "about" }
        })
    }

    #[test]
    fn test_content_with_parent_loop_is_rejected() {
        let content = serde_json::json!({
            "pages": { "1": node(1, Some(2)), "2": node(2, Some(1)) }
        });
        let err = Site::from_json_str(&content.to_string()).unwrap_err();
        assert!(matches!(err, SiteError::SchemaInvalid { .. }));
        assert!(err
            .field_errors()
            .iter()
            .any(|e| e.field == "pages[1].parent" && e.message.contains("loops")));
    }

    #[test]
    fn test_content_with_missing_parent_or_wrong_id_is_rejected() {
        let content = serde_json::json!({
            "pages": { "1": node(1, Some(9)), "2": node(3, None) }
        });
        let err = Site::from_json_str(&content.to_string()).unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["pages[1].parent", "pages[2].id"]);
    }

    #[test]
    fn test_delete_page_terminates_on_parent_loop() {
        let (mut site, home) = site_with_home();
        let about = site.create_page(Some(home), PageKind::About).unwrap();
        // Only reachable by editing nodes in place; loading rejects it.
        site.pages.get_mut(&home).unwrap().meta.parent = Some(about);

        let problems = site.validate_all();
        assert_eq!(problems.len(), 2);

        let report = site.delete_page(home).unwrap();
        assert_eq!(report.pages_deleted, 2);
        assert_eq!(site.pages().count(), 0);
    }

    #[test]
    fn test_delete_image_honours_relation_table() {
        let (mut site, home) = site_with_home();
        let image = site.add_image("Hero", "hero.jpg", 1920, 1080);
        site.update_draft(home, |page| {
            if let Page::Home(h) = page {
                h.services_preview.push(ServiceBlock::new("Avec image").with_image(image));
                h.services_preview.push(ServiceBlock::new("Sans image"));
            }
        })
        .unwrap();

        // ServiceBlock.image is a soft reference: both blocks survive.
        let report = site.delete_image(image).unwrap();
        assert_eq!(report.references_cleared, 1);
        assert_eq!(report.owned_rows_deleted, 0);
        match &site.page(home).unwrap().draft {
            Page::Home(h) => assert_eq!(h.services_preview.len(), 2),
            _ => unreachable!(),
        }
    }
}
