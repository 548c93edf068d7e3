//! State owner between the loader, the view filter and a presentation layer.
use tracing::{debug, info};

use crate::error::DataUnavailable;
use crate::loader::{DataOrigin, MenuLoader};
use crate::model::MenuDataset;
use crate::view::{compute_view, FilteredView};

/// Inputs the presentation layer changes between renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub query: String,
    pub veg_only: bool,
}

#[derive(Debug, Default)]
pub struct MenuController {
    dataset: Option<MenuDataset>,
    origin: Option<DataOrigin>,
    state: ViewState,
}

impl MenuController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller seeded with an already-normalized dataset.
    pub fn with_dataset(dataset: MenuDataset) -> Self {
        Self {
            dataset: Some(dataset),
            ..Self::default()
        }
    }

    /// Run the acquisition chain once and keep the result.
    pub async fn initial_load(&mut self, loader: &MenuLoader) -> Result<&MenuDataset, DataUnavailable> {
        let loaded = loader.load().await.ok_or(DataUnavailable)?;
        info!(
            origin = %loaded.origin,
            categories = loaded.dataset.categories.len(),
            menu_items = loaded.dataset.menu_items.len(),
            "menu data loaded"
        );
        self.origin = Some(loaded.origin);
        Ok(self.dataset.insert(loaded.dataset))
    }

    pub fn on_query_changed(&mut self, text: impl Into<String>) -> Result<FilteredView, DataUnavailable> {
        self.state.query = text.into();
        debug!(query = %self.state.query, "query changed");
        self.current_view()
    }

    pub fn on_veg_only_toggled(&mut self, veg_only: bool) -> Result<FilteredView, DataUnavailable> {
        self.state.veg_only = veg_only;
        debug!(veg_only, "vegetarian filter changed");
        self.current_view()
    }

    pub fn current_view(&self) -> Result<FilteredView, DataUnavailable> {
        let dataset = self.dataset.as_ref().ok_or(DataUnavailable)?;
        Ok(compute_view(dataset, &self.state.query, self.state.veg_only))
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn dataset(&self) -> Option<&MenuDataset> {
        self.dataset.as_ref()
    }

    pub fn origin(&self) -> Option<DataOrigin> {
        self.origin
    }
}
