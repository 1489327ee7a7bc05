//! Categoría del foro.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<u64>,
    /// Solo visible para staff cuando es true.
    pub read_restricted: bool,
}

impl Category {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = name.to_lowercase().replace(' ', "-");
        Self { id,
               name,
               slug,
               parent_id: None,
               read_restricted: false }
    }

    pub fn restricted(mut self) -> Self {
        self.read_restricted = true;
        self
    }

    pub fn subcategory_of(mut self, parent_id: u64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_derives_from_name() {
        let cat = Category::new(7, "Site Feedback");
        assert_eq!(cat.slug, "site-feedback");
    }
}
