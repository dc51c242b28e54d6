//! Declared ownership of every cross-entity relation.
//!
//! Deletion in `core::site` walks these descriptors instead of hard-coding
//! per-field behaviour, so the soft/owning split is visible in one place.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Image,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDelete {
    /// Soft reference: null the field, keep the holder.
    SetNull,
    /// Owning relation: delete the holder along with the target.
    Cascade,
}

impl OnDelete {
    /// Apply this policy to one reference slot pointing at a deleted
    /// target. Slots pointing elsewhere are untouched.
    pub fn apply_to_slot<T: PartialEq>(self, slot: &mut Option<T>, target: &T) -> DeleteEffect {
        if slot.as_ref() != Some(target) {
            return DeleteEffect::default();
        }
        match self {
            OnDelete::SetNull => {
                *slot = None;
                DeleteEffect {
                    cleared: 1,
                    ..Default::default()
                }
            }
            OnDelete::Cascade => DeleteEffect {
                delete_holder: true,
                ..Default::default()
            },
        }
    }
}

/// What applying delete policies did to one holder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteEffect {
    /// References set to null.
    pub cleared: usize,
    /// Owned rows removed from the holder.
    pub rows_deleted: usize,
    /// The holder itself has to be deleted.
    pub delete_holder: bool,
}

impl DeleteEffect {
    pub fn merge(&mut self, other: DeleteEffect) {
        self.cleared += other.cleared;
        self.rows_deleted += other.rows_deleted;
        self.delete_holder |= other.delete_holder;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub holder: &'static str,
    pub field: &'static str,
    pub target: Target,
    pub on_delete: OnDelete,
}

const fn relation(
    holder: &'static str,
    field: &'static str,
    target: Target,
    on_delete: OnDelete,
) -> Relation {
    Relation {
        holder,
        field,
        target,
        on_delete,
    }
}

pub const RELATIONS: &[Relation] = &[
    relation("HomePage", "hero_background_image", Target::Image, OnDelete::SetNull),
    relation("HomePage", "hero_primary_button.page", Target::Page, OnDelete::SetNull),
    relation("HomePage", "hero_secondary_button.page", Target::Page, OnDelete::SetNull),
    relation("ServiceBlock", "image", Target::Image, OnDelete::SetNull),
    relation("AboutPage", "image", Target::Image, OnDelete::SetNull),
    relation("GalerieImage", "page", Target::Page, OnDelete::Cascade),
    relation("GalerieImage", "image", Target::Image, OnDelete::Cascade),
    relation("FormField", "page", Target::Page, OnDelete::Cascade),
];

pub fn relations_to(target: Target) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |r| r.target == target)
}

/// Look up the policy for one relation.
pub fn policy(holder: &str, field: &str) -> Option<OnDelete> {
    RELATIONS
        .iter()
        .find(|r| r.holder == holder && r.field == field)
        .map(|r| r.on_delete)
}
