//! Reusable content blocks and the ordered streams that hold them.
//!
//! A stream is a list of tagged blocks. Only `service` exists today, but
//! pages store `Block` rather than `ServiceBlock` so new kinds can be
//! added without changing the stored shape of existing streams.

use crate::domain::model::ImageId;
use crate::domain::relations::{DeleteEffect, OnDelete};
use crate::utils::error::FieldError;
use crate::utils::validation::check_char_field;
use serde::{Deserialize, Serialize};

pub const SERVICE_TITLE_MAX_LENGTH: usize = 120;

/// A service presentation: badge, title, short description, illustration
/// and a list of key points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<ImageId>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ServiceBlock {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image(mut self, image: ImageId) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_char_field(
            &mut errors,
            "title",
            &self.title,
            Some(SERVICE_TITLE_MAX_LENGTH),
            true,
        );
        for (i, feature) in self.features.iter().enumerate() {
            if feature.trim().is_empty() {
                errors.push(FieldError::required(format!("features[{}]", i)));
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Service,
}

impl BlockKind {
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Service => "Service",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            BlockKind::Service => "cog",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Block {
    Service(ServiceBlock),
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Service(_) => BlockKind::Service,
        }
    }

    pub fn validate(&self) -> Vec<FieldError> {
        match self {
            Block::Service(service) => service.validate(),
        }
    }

    /// The image reference this block holds, if its kind has one.
    pub fn image_slot(&mut self) -> Option<&mut Option<ImageId>> {
        match self {
            Block::Service(service) => Some(&mut service.image),
        }
    }
}

impl From<ServiceBlock> for Block {
    fn from(service: ServiceBlock) -> Self {
        Block::Service(service)
    }
}

/// A block together with the stream-local id the editor UI tracks it by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChild {
    pub id: u32,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stream {
    children: Vec<StreamChild>,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn next_id(&self) -> u32 {
        self.children.iter().map(|c| c.id).max().map_or(1, |id| id + 1)
    }

    /// Append a block and return its stream-local id.
    pub fn push(&mut self, block: impl Into<Block>) -> u32 {
        let id = self.next_id();
        self.children.push(StreamChild {
            id,
            block: block.into(),
        });
        id
    }

    /// Insert at `index` (clamped to the end of the stream).
    pub fn insert(&mut self, index: usize, block: impl Into<Block>) -> u32 {
        let id = self.next_id();
        let index = index.min(self.children.len());
        self.children.insert(
            index,
            StreamChild {
                id,
                block: block.into(),
            },
        );
        id
    }

    pub fn remove(&mut self, index: usize) -> Option<Block> {
        if index < self.children.len() {
            Some(self.children.remove(index).block)
        } else {
            None
        }
    }

    /// Move the block at `from` so that it ends up at position `to`.
    pub fn move_block(&mut self, from: usize, to: usize) -> bool {
        if from >= self.children.len() || to >= self.children.len() {
            return false;
        }
        let child = self.children.remove(from);
        self.children.insert(to, child);
        true
    }

    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= self.children.len() || b >= self.children.len() {
            return false;
        }
        self.children.swap(a, b);
        true
    }

    pub fn children(&self) -> &[StreamChild] {
        &self.children
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.children.get(index).map(|c| &c.block)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().map(|c| &c.block)
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceBlock> {
        self.iter().map(|block| match block {
            Block::Service(service) => service,
        })
    }

    /// Validate every child; field paths are prefixed with `name[index]`.
    pub fn validate(&self, name: &str) -> Vec<FieldError> {
        self.children
            .iter()
            .enumerate()
            .flat_map(|(i, child)| {
                let prefix = format!("{}[{}]", name, i);
                child
                    .block
                    .validate()
                    .into_iter()
                    .map(move |e| e.nested(&prefix))
            })
            .collect()
    }

    /// Apply `on_delete` to every block pointing at a deleted image.
    /// Cascading drops the block, the rest keep their position.
    pub fn apply_image_deletion(&mut self, on_delete: OnDelete, image: ImageId) -> DeleteEffect {
        let mut effect = DeleteEffect::default();
        self.children.retain_mut(|child| {
            let Some(slot) = child.block.image_slot() else {
                return true;
            };
            let outcome = on_delete.apply_to_slot(slot, &image);
            effect.cleared += outcome.cleared;
            if outcome.delete_holder {
                effect.rows_deleted += 1;
                false
            } else {
                true
            }
        });
        effect
    }
}

impl FromIterator<ServiceBlock> for Stream {
    fn from_iter<I: IntoIterator<Item = ServiceBlock>>(iter: I) -> Self {
        let mut stream = Stream::new();
        for service in iter {
            stream.push(service);
        }
        stream
    }
}
