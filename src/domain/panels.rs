//! Admin editing panels: which fields are edited together and under which
//! heading. The admin UI renders these as declared.

use crate::domain::pages::PageKind;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum Panel {
    Field {
        field: &'static str,
    },
    PageChooser {
        field: &'static str,
    },
    MultiField {
        heading: &'static str,
        children: Vec<Panel>,
    },
    /// Inline editing of an owned child collection.
    Inline {
        relation: &'static str,
        label: &'static str,
    },
    FormSubmissions,
}

fn field(name: &'static str) -> Panel {
    Panel::Field { field: name }
}

fn page_chooser(name: &'static str) -> Panel {
    Panel::PageChooser { field: name }
}

fn group(heading: &'static str, children: Vec<Panel>) -> Panel {
    Panel::MultiField { heading, children }
}

impl Panel {
    /// Field names edited by this panel, depth first.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Panel::Field { field } | Panel::PageChooser { field } => vec![*field],
            Panel::MultiField { children, .. } => children.iter().flat_map(Panel::fields).collect(),
            Panel::Inline { relation, .. } => vec![*relation],
            Panel::FormSubmissions => Vec::new(),
        }
    }
}

/// The generic page panels every variant starts with.
fn base_panels() -> Vec<Panel> {
    vec![field("title")]
}

pub fn content_panels(kind: PageKind) -> Vec<Panel> {
    let mut panels = base_panels();
    match kind {
        PageKind::Home => {
            panels.push(group(
                "Section hero (bandeau principal)",
                vec![
                    field("hero_kicker"),
                    field("hero_title"),
                    field("hero_subtitle"),
                    field("hero_background_image"),
                    field("hero_primary_button.label"),
                    page_chooser("hero_primary_button.page"),
                    field("hero_secondary_button.label"),
                    page_chooser("hero_secondary_button.page"),
                ],
            ));
            panels.push(group(
                "Aperçu des services sur la page d’accueil",
                vec![
                    field("services_preview_title"),
                    field("services_preview_intro"),
                    field("services_preview"),
                ],
            ));
        }
        PageKind::Services => {
            panels.extend([field("intro_title"), field("intro_subtitle"), field("services")]);
        }
        PageKind::About => {
            panels.extend([
                field("intro_title"),
                field("intro_subtitle"),
                field("body"),
                field("image"),
                field("image_caption"),
            ]);
        }
        PageKind::Galerie => {
            panels.push(field("intro"));
            panels.push(Panel::Inline {
                relation: "images",
                label: "Images de la galerie",
            });
        }
        PageKind::Contact => {
            panels.push(group(
                "Introduction",
                vec![field("intro_title"), field("intro_subtitle"), field("contact_text")],
            ));
            panels.push(group(
                "Coordonnées affichées",
                vec![
                    field("contact_email"),
                    field("contact_phone"),
                    field("contact_address"),
                ],
            ));
            panels.push(group(
                "Configuration des emails",
                vec![field("to_address"), field("from_address"), field("subject")],
            ));
            panels.push(Panel::Inline {
                relation: "form_fields",
                label: "Champs du formulaire",
            });
            panels.push(field("thank_you_text"));
        }
    }
    panels
}

/// Panels for the inline GalerieImage editor.
pub fn galerie_image_panels() -> Vec<Panel> {
    vec![field("image"), field("caption")]
}

/// Extra tab listing a contact page's submissions.
pub fn submissions_panels(kind: PageKind) -> Vec<Panel> {
    match kind {
        PageKind::Contact => vec![Panel::FormSubmissions],
        _ => Vec::new(),
    }
}
