//! Typed fields of each page variant, with their editorial defaults.
//!
//! Every text field has a default so that a freshly created page passes
//! validation without any input from the editor.

use crate::domain::blocks::Stream;
use crate::domain::forms::{self, FormField};
use crate::domain::model::{ImageId, PageId};
use crate::domain::relations::{DeleteEffect, Relation};
use crate::utils::error::FieldError;
use crate::utils::validation::{check_address_list, check_char_field, check_email_field};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const BUTTON_LABEL_MAX_LENGTH: usize = 50;
pub const CAPTION_MAX_LENGTH: usize = 255;

/// A call-to-action: the label persists even if the target page goes away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonLink {
    pub label: String,
    #[serde(default)]
    pub page: Option<PageId>,
}

impl ButtonLink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            page: None,
        }
    }

    pub fn to_page(mut self, page: PageId) -> Self {
        self.page = Some(page);
        self
    }
}

// ---------------------------------------------------------------- HomePage

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomePage {
    pub hero_kicker: String,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_background_image: Option<ImageId>,
    pub hero_primary_button: ButtonLink,
    pub hero_secondary_button: ButtonLink,
    pub services_preview_title: String,
    pub services_preview_intro: String,
    pub services_preview: Stream,
}

impl Default for HomePage {
    fn default() -> Self {
        Self {
            hero_kicker: "Bienvenue".to_string(),
            hero_title: "Titre de la page d’accueil".to_string(),
            hero_subtitle: "Sous-titre de présentation pour la page d’accueil.".to_string(),
            hero_background_image: None,
            hero_primary_button: ButtonLink::new("En savoir plus sur nous"),
            hero_secondary_button: ButtonLink::new("Discutons de votre projet"),
            services_preview_title: "Nos services".to_string(),
            services_preview_intro: "Un aperçu rapide de nos services.".to_string(),
            services_preview: Stream::new(),
        }
    }
}

impl HomePage {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_char_field(&mut errors, "hero_kicker", &self.hero_kicker, Some(150), false);
        check_char_field(&mut errors, "hero_title", &self.hero_title, Some(200), true);
        check_char_field(
            &mut errors,
            "hero_primary_button.label",
            &self.hero_primary_button.label,
            Some(BUTTON_LABEL_MAX_LENGTH),
            true,
        );
        check_char_field(
            &mut errors,
            "hero_secondary_button.label",
            &self.hero_secondary_button.label,
            Some(BUTTON_LABEL_MAX_LENGTH),
            false,
        );
        check_char_field(
            &mut errors,
            "services_preview_title",
            &self.services_preview_title,
            Some(150),
            true,
        );
        errors.extend(self.services_preview.validate("services_preview"));
        errors
    }
}

// ------------------------------------------------------------ ServicesPage

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesPage {
    pub intro_title: String,
    pub intro_subtitle: String,
    pub services: Stream,
}

impl Default for ServicesPage {
    fn default() -> Self {
        Self {
            intro_title: "Nos services".to_string(),
            intro_subtitle: "Voici un exemple de section services que vous pouvez adapter."
                .to_string(),
            services: Stream::new(),
        }
    }
}

impl ServicesPage {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_char_field(&mut errors, "intro_title", &self.intro_title, Some(150), true);
        errors.extend(self.services.validate("services"));
        errors
    }
}

// --------------------------------------------------------------- AboutPage

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutPage {
    pub intro_title: String,
    pub intro_subtitle: String,
    /// Rich text, stored as the editor produced it.
    pub body: String,
    pub image: Option<ImageId>,
    /// Not tied to `image`: a caption may exist without one.
    pub image_caption: String,
}

impl Default for AboutPage {
    fn default() -> Self {
        Self {
            intro_title: "À propos".to_string(),
            intro_subtitle: "En savoir plus sur nous.".to_string(),
            body: String::new(),
            image: None,
            image_caption: String::new(),
        }
    }
}

impl AboutPage {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_char_field(&mut errors, "intro_title", &self.intro_title, Some(150), true);
        check_char_field(
            &mut errors,
            "image_caption",
            &self.image_caption,
            Some(CAPTION_MAX_LENGTH),
            false,
        );
        errors
    }
}

// ------------------------------------------------------------- GaleriePage

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalerieImage {
    pub id: u32,
    pub image: ImageId,
    #[serde(default)]
    pub caption: String,
    pub sort_order: i32,
}

/// Owns its images: they are stored inline and go away with the page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GaleriePage {
    pub intro: String,
    images: Vec<GalerieImage>,
}

impl GaleriePage {
    /// Images in display order.
    pub fn images(&self) -> Vec<&GalerieImage> {
        let mut images: Vec<&GalerieImage> = self.images.iter().collect();
        images.sort_by_key(|i| (i.sort_order, i.id));
        images
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Append after the current last position; returns the entry id.
    pub fn add_image(&mut self, image: ImageId, caption: impl Into<String>) -> u32 {
        let id = self.images.iter().map(|i| i.id).max().map_or(1, |id| id + 1);
        let sort_order = self
            .images
            .iter()
            .map(|i| i.sort_order)
            .max()
            .map_or(0, |order| order + 1);
        self.images.push(GalerieImage {
            id,
            image,
            caption: caption.into(),
            sort_order,
        });
        id
    }

    /// Remove one entry. Siblings keep their positions, leaving a gap.
    pub fn remove_image(&mut self, id: u32) -> Option<GalerieImage> {
        let index = self.images.iter().position(|i| i.id == id)?;
        Some(self.images.remove(index))
    }

    /// Move entry `id` to display position `to`, rewriting sort orders.
    pub fn move_image(&mut self, id: u32, to: usize) -> bool {
        let mut order: Vec<u32> = self.images().iter().map(|i| i.id).collect();
        let Some(from) = order.iter().position(|i| *i == id) else {
            return false;
        };
        if to >= order.len() {
            return false;
        }
        let moved = order.remove(from);
        order.insert(to, moved);
        for (position, entry_id) in order.iter().enumerate() {
            if let Some(entry) = self.images.iter_mut().find(|i| i.id == *entry_id) {
                entry.sort_order = position as i32;
            }
        }
        true
    }

    /// Drop every entry showing `image`; returns how many were removed.
    pub fn cascade_image(&mut self, image: ImageId) -> usize {
        let before = self.images.len();
        self.images.retain(|i| i.image != image);
        before - self.images.len()
    }

    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for (i, entry) in self.images().iter().enumerate() {
            let mut entry_errors = Vec::new();
            check_char_field(
                &mut entry_errors,
                "caption",
                &entry.caption,
                Some(CAPTION_MAX_LENGTH),
                false,
            );
            let prefix = format!("images[{}]", i);
            errors.extend(entry_errors.into_iter().map(|e| e.nested(&prefix)));
        }
        errors
    }
}

// ------------------------------------------------------------- ContactPage

pub const DEFAULT_TO_ADDRESS: &str = "contact@exemple.com";
pub const DEFAULT_FROM_ADDRESS: &str = "noreply@monsite.com";
pub const DEFAULT_SUBJECT: &str = "Nouveau message depuis votre site vitrine";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactPage {
    pub intro_title: String,
    pub intro_subtitle: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_address: String,
    pub contact_text: String,
    /// Comma-separated recipient list.
    pub to_address: String,
    pub from_address: String,
    pub subject: String,
    pub thank_you_text: String,
    pub form_fields: Vec<FormField>,
}

impl Default for ContactPage {
    fn default() -> Self {
        Self {
            intro_title: "Contact".to_string(),
            intro_subtitle: "Un exemple de page contact avec un formulaire simple.".to_string(),
            contact_email: "contact@exemple.com".to_string(),
            contact_phone: String::new(),
            contact_address: "Adresse de votre entreprise".to_string(),
            contact_text: String::new(),
            to_address: DEFAULT_TO_ADDRESS.to_string(),
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            thank_you_text: "Merci ! Votre message a bien été envoyé.".to_string(),
            form_fields: Vec::new(),
        }
    }
}

impl ContactPage {
    /// Append a field after the current last one, deriving its clean name.
    pub fn add_field(&mut self, mut field: FormField) {
        field.sort_order = self
            .form_fields
            .iter()
            .map(|f| f.sort_order)
            .max()
            .map_or(0, |order| order + 1);
        if field.clean_name.is_empty() {
            field.clean_name = forms::clean_name(&field.label);
        }
        self.form_fields.push(field);
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.add_field(field);
        self
    }

    /// Form fields in the order visitors see them.
    pub fn fields(&self) -> Vec<&FormField> {
        forms::ordered(&self.form_fields)
    }

    pub fn recipients(&self) -> Vec<String> {
        crate::utils::validation::split_addresses(&self.to_address)
    }

    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_char_field(&mut errors, "intro_title", &self.intro_title, Some(150), true);
        check_email_field(&mut errors, "contact_email", &self.contact_email, false);
        check_char_field(&mut errors, "contact_phone", &self.contact_phone, Some(50), false);
        check_char_field(
            &mut errors,
            "contact_address",
            &self.contact_address,
            Some(255),
            false,
        );
        check_address_list(&mut errors, "to_address", &self.to_address, 255, true);
        check_char_field(&mut errors, "from_address", &self.from_address, Some(255), true);
        check_char_field(&mut errors, "subject", &self.subject, Some(255), true);

        let mut seen = HashSet::new();
        for (i, field) in self.fields().into_iter().enumerate() {
            let prefix = format!("form_fields[{}]", i);
            errors.extend(field.validate().into_iter().map(|e| e.nested(&prefix)));
            let key = field.key();
            if !key.is_empty() && !seen.insert(key) {
                errors.push(
                    FieldError::new(
                        "label",
                        format!("There is another field with the label {}, please change one of them.", field.label),
                    )
                    .nested(&prefix),
                );
            }
        }
        errors
    }

    /// Email routing still pointing at placeholder values. Harmless while
    /// building the site, a problem once it is in production.
    pub fn config_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.to_address.trim() == DEFAULT_TO_ADDRESS {
            warnings.push(format!(
                "to_address is still the placeholder {}; messages will not reach you",
                DEFAULT_TO_ADDRESS
            ));
        }
        if self.from_address.trim() == DEFAULT_FROM_ADDRESS {
            warnings.push(format!(
                "from_address is still the placeholder {}",
                DEFAULT_FROM_ADDRESS
            ));
        }
        if self.to_address.trim().is_empty() {
            warnings.push("to_address is empty; submissions will not be emailed".to_string());
        }
        warnings
    }
}

// -------------------------------------------------------------------- Page

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Home,
    Services,
    About,
    Galerie,
    Contact,
}

impl PageKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            PageKind::Home => "HomePage",
            PageKind::Services => "ServicesPage",
            PageKind::About => "AboutPage",
            PageKind::Galerie => "GaleriePage",
            PageKind::Contact => "ContactPage",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            PageKind::Home => "Accueil",
            PageKind::Services => "Nos services",
            PageKind::About => "À propos",
            PageKind::Galerie => "Galerie",
            PageKind::Contact => "Contact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Page {
    Home(HomePage),
    Services(ServicesPage),
    About(AboutPage),
    Galerie(GaleriePage),
    Contact(ContactPage),
}

impl Page {
    pub fn new(kind: PageKind) -> Self {
        match kind {
            PageKind::Home => Page::Home(HomePage::default()),
            PageKind::Services => Page::Services(ServicesPage::default()),
            PageKind::About => Page::About(AboutPage::default()),
            PageKind::Galerie => Page::Galerie(GaleriePage::default()),
            PageKind::Contact => Page::Contact(ContactPage::default()),
        }
    }

    pub fn kind(&self) -> PageKind {
        match self {
            Page::Home(_) => PageKind::Home,
            Page::Services(_) => PageKind::Services,
            Page::About(_) => PageKind::About,
            Page::Galerie(_) => PageKind::Galerie,
            Page::Contact(_) => PageKind::Contact,
        }
    }

    pub fn validate(&self) -> Vec<FieldError> {
        match self {
            Page::Home(page) => page.validate(),
            Page::Services(page) => page.validate(),
            Page::About(page) => page.validate(),
            Page::Galerie(page) => page.validate(),
            Page::Contact(page) => page.validate(),
        }
    }

    /// Apply one image relation's delete policy to the slots this page
    /// holds for it.
    pub fn apply_image_deletion(&mut self, relation: &Relation, image: ImageId) -> DeleteEffect {
        let on_delete = relation.on_delete;
        match (self, relation.holder, relation.field) {
            (Page::Home(page), "HomePage", "hero_background_image") => {
                on_delete.apply_to_slot(&mut page.hero_background_image, &image)
            }
            (Page::About(page), "AboutPage", "image") => {
                on_delete.apply_to_slot(&mut page.image, &image)
            }
            (Page::Home(page), "ServiceBlock", "image") => {
                page.services_preview.apply_image_deletion(on_delete, image)
            }
            (Page::Services(page), "ServiceBlock", "image") => {
                page.services.apply_image_deletion(on_delete, image)
            }
            // A gallery entry cannot exist without its image.
            (Page::Galerie(page), "GalerieImage", "image") => DeleteEffect {
                rows_deleted: page.cascade_image(image),
                ..Default::default()
            },
            _ => DeleteEffect::default(),
        }
    }

    /// Apply one page relation's delete policy to the links this page holds.
    pub fn apply_page_deletion(&mut self, relation: &Relation, target: PageId) -> DeleteEffect {
        let on_delete = relation.on_delete;
        match (self, relation.holder, relation.field) {
            (Page::Home(page), "HomePage", "hero_primary_button.page") => {
                on_delete.apply_to_slot(&mut page.hero_primary_button.page, &target)
            }
            (Page::Home(page), "HomePage", "hero_secondary_button.page") => {
                on_delete.apply_to_slot(&mut page.hero_secondary_button.page, &target)
            }
            _ => DeleteEffect::default(),
        }
    }

    /// Every image this page points at, with the field holding it.
    pub fn image_refs(&self) -> Vec<(String, ImageId)> {
        fn stream_refs(name: &str, stream: &Stream) -> Vec<(String, ImageId)> {
            stream
                .services()
                .enumerate()
                .filter_map(|(i, s)| s.image.map(|id| (format!("{}[{}].image", name, i), id)))
                .collect()
        }

        match self {
            Page::Home(page) => {
                let mut refs: Vec<(String, ImageId)> = page
                    .hero_background_image
                    .map(|id| ("hero_background_image".to_string(), id))
                    .into_iter()
                    .collect();
                refs.extend(stream_refs("services_preview", &page.services_preview));
                refs
            }
            Page::Services(page) => stream_refs("services", &page.services),
            Page::About(page) => page
                .image
                .map(|id| ("image".to_string(), id))
                .into_iter()
                .collect(),
            Page::Galerie(page) => page
                .images()
                .iter()
                .enumerate()
                .map(|(i, entry)| (format!("images[{}].image", i), entry.image))
                .collect(),
            Page::Contact(_) => Vec::new(),
        }
    }

    /// Every page this page links to, with the field holding the link.
    pub fn page_refs(&self) -> Vec<(String, PageId)> {
        match self {
            Page::Home(page) => [
                ("hero_primary_button.page", page.hero_primary_button.page),
                ("hero_secondary_button.page", page.hero_secondary_button.page),
            ]
            .into_iter()
            .filter_map(|(field, target)| target.map(|id| (field.to_string(), id)))
            .collect(),
            _ => Vec::new(),
        }
    }

    /// Number of owned child rows (gallery entries, form fields).
    pub fn owned_rows(&self) -> usize {
        match self {
            Page::Galerie(page) => page.image_count(),
            Page::Contact(page) => page.form_fields.len(),
            _ => 0,
        }
    }

    pub fn as_contact(&self) -> Option<&ContactPage> {
        match self {
            Page::Contact(page) => Some(page),
            _ => None,
        }
    }

    pub fn as_galerie(&self) -> Option<&GaleriePage> {
        match self {
            Page::Galerie(page) => Some(page),
            _ => None,
        }
    }
}
