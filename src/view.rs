//! Pure derivation of what to display from (dataset, query, veg-only).
use serde::Serialize;
use std::cmp::Ordering;

use crate::model::{Category, MenuDataset, MenuItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub category: Category,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum FilteredView {
    /// No search text: active categories with their eligible items.
    Categorized { sections: Vec<Section> },
    /// Search text present: matching items, no grouping.
    FlatSearch { items: Vec<MenuItem> },
}

impl FilteredView {
    pub fn item_count(&self) -> usize {
        match self {
            FilteredView::Categorized { sections } => sections.iter().map(|s| s.items.len()).sum(),
            FilteredView::FlatSearch { items } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// All displayed items in display order.
    pub fn items(&self) -> Vec<&MenuItem> {
        match self {
            FilteredView::Categorized { sections } => {
                sections.iter().flat_map(|s| s.items.iter()).collect()
            }
            FilteredView::FlatSearch { items } => items.iter().collect(),
        }
    }
}

fn is_eligible(item: &MenuItem, veg_only: bool) -> bool {
    item.is_available && (!veg_only || item.is_vegetarian)
}

fn matches_query(item: &MenuItem, needle: &str) -> bool {
    item.name.to_lowercase().contains(needle) || item.description.to_lowercase().contains(needle)
}

pub fn compute_view(dataset: &MenuDataset, query: &str, veg_only: bool) -> FilteredView {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        categorized(dataset, veg_only)
    } else {
        flat_search(dataset, &needle, veg_only)
    }
}

fn categorized(dataset: &MenuDataset, veg_only: bool) -> FilteredView {
    let mut categories: Vec<&Category> = dataset.categories.iter().filter(|c| c.is_active).collect();
    // sort_by is stable: equal display orders keep input order
    categories.sort_by(|a, b| a.display_order.total_cmp(&b.display_order));

    let sections = categories
        .into_iter()
        .filter_map(|category| {
            let mut items: Vec<MenuItem> = dataset
                .menu_items
                .iter()
                .filter(|i| i.category_id == category.id && is_eligible(i, veg_only))
                .cloned()
                .collect();
            if items.is_empty() {
                return None;
            }
            items.sort_by(|a, b| a.display_order.total_cmp(&b.display_order));
            Some(Section {
                category: category.clone(),
                items,
            })
        })
        .collect();

    FilteredView::Categorized { sections }
}

fn flat_search(dataset: &MenuDataset, needle: &str, veg_only: bool) -> FilteredView {
    let mut items: Vec<MenuItem> = dataset
        .menu_items
        .iter()
        .filter(|i| is_eligible(i, veg_only) && matches_query(i, needle))
        .cloned()
        .collect();
    // Orphans (no matching category) sort after every real category.
    let category_order = |item: &MenuItem| dataset.category(item.category_id).map(|c| c.display_order);
    items.sort_by(|a, b| {
        let by_category = match (category_order(a), category_order(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_category.then_with(|| a.display_order.total_cmp(&b.display_order))
    });
    FilteredView::FlatSearch { items }
}
