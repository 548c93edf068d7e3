use serde::{Deserialize, Serialize};

/// Sort key used when a record carries no usable `displayOrder`.
pub const DEFAULT_DISPLAY_ORDER: f64 = 999.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub display_order: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub price_euro: f64,
    pub is_available: bool,
    pub is_vegetarian: bool,
    pub display_order: f64,
}

/// Normalized menu: every record here has passed the validator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuDataset {
    pub categories: Vec<Category>,
    pub menu_items: Vec<MenuItem>,
}

impl MenuDataset {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.menu_items.is_empty()
    }

    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

impl MenuItem {
    /// Price as shown to guests, e.g. `€7.95`.
    pub fn price_label(&self) -> String {
        format!("€{:.2}", self.price_euro)
    }
}
