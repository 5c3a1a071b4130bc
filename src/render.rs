use crate::models::{Identifier, ResourceItem};

/// What a card's edit or delete control asks the controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    Edit(Identifier),
    Delete(Identifier),
}

/// Maps items to the actions their controls trigger.
#[derive(Debug, Clone, Copy)]
pub struct ActionBindings<'a> {
    id_field: &'a str,
}

impl<'a> ActionBindings<'a> {
    pub fn new(id_field: &'a str) -> Self {
        Self { id_field }
    }

    pub fn id_field(&self) -> &str {
        self.id_field
    }

    pub fn on_edit(&self, item: &ResourceItem) -> Option<ItemAction> {
        item.identifier(self.id_field).map(ItemAction::Edit)
    }

    pub fn on_delete(&self, item: &ResourceItem) -> Option<ItemAction> {
        item.identifier(self.id_field).map(ItemAction::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// User-visible message raised by a controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            message: message.into(),
        }
    }
}

/// Presentation side of a list view, supplied by the embedding program.
pub trait RenderAdapter {
    fn render(&mut self, items: &[ResourceItem], bindings: ActionBindings<'_>);

    fn notify(&mut self, notice: &Notice) {
        let _ = notice;
    }
}

impl<R: RenderAdapter + ?Sized> RenderAdapter for &mut R {
    fn render(&mut self, items: &[ResourceItem], bindings: ActionBindings<'_>) {
        (**self).render(items, bindings);
    }

    fn notify(&mut self, notice: &Notice) {
        (**self).notify(notice);
    }
}
