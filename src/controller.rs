use crate::client::ResourceApi;
use crate::errors::{ClientError, Result};
use crate::models::{Identifier, ResourceItem};
use crate::render::{ActionBindings, Notice, RenderAdapter};
use crate::state::ListState;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Loading,
    Ready,
    Error,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Drives one list view: keeps the selection, refetches after every change and
/// hands fresh items to the renderer. Writes always end in a refetch, never a local patch.
pub struct ListController<A, R> {
    label: String,
    api: A,
    renderer: R,
    list: ListState,
    state: ControllerState,
}

impl<A: ResourceApi, R: RenderAdapter> ListController<A, R> {
    pub fn new(label: impl Into<String>, api: A, renderer: R) -> Self {
        Self {
            label: label.into(),
            api,
            renderer,
            list: ListState::new(),
            state: ControllerState::Idle,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn items(&self) -> &[ResourceItem] {
        self.list.items()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_parts(self) -> (A, R) {
        (self.api, self.renderer)
    }

    /// Fetches the current selection. On failure the previous items stay in place.
    ///
    /// The state stays `Ready` (or `Error`) once the items are rendered, until the
    /// next operation starts. `Idle` is only the state before the first refresh.
    pub async fn refresh(&mut self) -> Result<()> {
        self.state = ControllerState::Loading;
        let query = self.list.query();

        match self.api.list(&query).await {
            Ok(items) => {
                info!(list = %self.label, page = query.page, count = items.len(), "list refreshed");
                self.list.replace_items(items);
                self.state = ControllerState::Ready;
                self.renderer
                    .render(self.list.items(), ActionBindings::new(self.api.id_field()));
                Ok(())
            }
            Err(err) => Err(self.fail(format!("Failed to fetch {}", self.label), err)),
        }
    }

    pub async fn next_page(&mut self) -> Result<()> {
        self.set_page(i64::from(self.list.page()) + 1).await
    }

    /// No-op on the first page.
    pub async fn prev_page(&mut self) -> Result<()> {
        if self.list.page() <= 1 {
            return Ok(());
        }
        self.set_page(i64::from(self.list.page()) - 1).await
    }

    pub async fn set_page(&mut self, page: i64) -> Result<()> {
        if let Err(err) = self.list.set_page(page) {
            return Err(self.fail(format!("Cannot open {} page", self.label), err));
        }
        self.refresh().await
    }

    /// Replaces filter and sort and starts again from page one.
    pub async fn apply_filter_sort(&mut self, filter: impl Into<String>, sort: impl Into<String>) -> Result<()> {
        self.list.set_filter(filter);
        self.list.set_sort(sort);
        self.list.set_page(1)?;
        self.refresh().await
    }

    pub async fn create_item(&mut self, item: &ResourceItem) -> Result<ResourceItem> {
        let created = match self.api.create(item).await {
            Ok(created) => created,
            Err(err) => return Err(self.fail(format!("Error adding {}", self.label), err)),
        };
        info!(list = %self.label, "item created");
        self.renderer
            .notify(&Notice::success(format!("{} successfully added!", capitalize(&self.label))));
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update_item(&mut self, id: &Identifier, patch: &ResourceItem) -> Result<()> {
        if let Err(err) = self.api.update(id, patch).await {
            return Err(self.fail(format!("Error updating {} {id}", self.label), err));
        }
        info!(list = %self.label, %id, "item updated");
        self.renderer
            .notify(&Notice::success(format!("{} successfully updated!", capitalize(&self.label))));
        self.refresh().await
    }

    pub async fn delete_item(&mut self, id: &Identifier) -> Result<()> {
        if let Err(err) = self.api.delete(id).await {
            return Err(self.fail(format!("Error deleting {} {id}", self.label), err));
        }
        info!(list = %self.label, %id, "item deleted");
        self.renderer
            .notify(&Notice::success(format!("{} successfully deleted!", capitalize(&self.label))));
        self.refresh().await
    }

    /// Clears the whole resource where the backend allows it, then refetches.
    pub async fn delete_all(&mut self) -> Result<()> {
        if let Err(err) = self.api.delete_all().await {
            return Err(self.fail(format!("Error deleting all {}s", self.label), err));
        }
        info!(list = %self.label, "all items deleted");
        self.renderer
            .notify(&Notice::success(format!("All {}s successfully deleted!", self.label)));
        self.refresh().await
    }

    fn fail(&mut self, context: String, err: ClientError) -> ClientError {
        warn!(list = %self.label, "{context}: {err}");
        self.state = ControllerState::Error;
        self.renderer.notify(&Notice::failure(format!("{context}: {err}")));
        err
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
