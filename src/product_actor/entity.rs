use crate::actor_framework::Record;
use crate::domain::{Product, ProductPatch};
use crate::gateway::Table;

impl Record for Product {
    type Patch = ProductPatch;
    const TABLE: Table = Table::Products;

    fn id(&self) -> &str {
        &self.id
    }

    /// Overwrites every field the patch carries. Empty optional text clears
    /// the field, matching how the store decodes it back.
    fn on_update(&mut self, patch: &ProductPatch) {
        let patch = patch.clone();
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(benefits) = patch.benefits {
            self.benefits = benefits;
        }
        if let Some(badges) = patch.badges {
            self.badges = badges;
        }
        if let Some(origin) = patch.origin {
            self.origin = Some(origin).filter(|s| !s.is_empty());
        }
        if let Some(volume) = patch.volume {
            self.volume = Some(volume).filter(|s| !s.is_empty());
        }
        if let Some(alcohol_content) = patch.alcohol_content {
            self.alcohol_content = Some(alcohol_content).filter(|s| !s.is_empty());
        }
        if let Some(aging_time) = patch.aging_time {
            self.aging_time = Some(aging_time).filter(|s| !s.is_empty());
        }
    }
}
