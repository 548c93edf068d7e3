//! Terminal presentation of a [`FilteredView`].
//!
//! Expand/collapse is presentation state only; the view filter never sees it.
use std::collections::HashSet;
use std::fmt::Write as _;

use crate::model::MenuItem;
use crate::theme::Theme;
use crate::view::FilteredView;

pub const UNAVAILABLE_MESSAGE: &str = "Menu temporarily unavailable. Please try again later.";

const COLLAPSED_MARKER: &str = "▶";
const EXPANDED_MARKER: &str = "▼";

/// Which category sections are open. Everything starts collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<i64>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, category_id: i64) -> bool {
        self.expanded.contains(&category_id)
    }

    /// Flip one section; returns whether it is now expanded.
    pub fn toggle(&mut self, category_id: i64) -> bool {
        if self.expanded.remove(&category_id) {
            false
        } else {
            self.expanded.insert(category_id);
            true
        }
    }

    pub fn expand_all(&mut self, category_ids: impl IntoIterator<Item = i64>) {
        self.expanded.extend(category_ids);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}

pub fn render_unavailable() -> String {
    UNAVAILABLE_MESSAGE.to_string()
}

pub fn render_view(view: &FilteredView, expansion: &ExpansionState) -> String {
    let mut out = String::new();
    match view {
        FilteredView::Categorized { sections } => {
            for section in sections {
                let category = &section.category;
                let open = expansion.is_expanded(category.id);
                let marker = if open { EXPANDED_MARKER } else { COLLAPSED_MARKER };
                let _ = writeln!(out, "{} {}", marker, category.name);
                if !category.description.is_empty() {
                    let _ = writeln!(out, "  {}", category.description);
                }
                if open {
                    for item in &section.items {
                        write_item(&mut out, item, "    ");
                    }
                }
            }
        }
        FilteredView::FlatSearch { items } => {
            for item in items {
                write_item(&mut out, item, "");
            }
        }
    }
    if out.is_empty() {
        out.push_str("No matching dishes.\n");
    }
    out
}

fn write_item(out: &mut String, item: &MenuItem, indent: &str) {
    let veg = if item.is_vegetarian { " (v)" } else { "" };
    let _ = writeln!(out, "{}{}{} {}", indent, item.name, veg, item.price_label());
    if !item.description.is_empty() {
        let _ = writeln!(out, "{}  {}", indent, item.description);
    }
}

/// One-line banner describing the active theme.
pub fn theme_banner(theme: Theme) -> String {
    format!("[theme: {}]", theme)
}
