pub mod client;
pub mod config;
pub mod console;
pub mod controller;
pub mod errors;
pub mod models;
pub mod render;
pub mod resource;
pub mod session;
pub mod startup;
pub mod state;
pub mod ui;

pub use client::{ListQuery, ResourceApi, ResourceClient, ResourceConfig};
pub use config::ClientConfig;
pub use controller::{ControllerState, ListController};
pub use errors::{ClientError, Result};
pub use models::{Identifier, ResourceItem};
pub use render::{ActionBindings, ItemAction, Notice, NoticeLevel, RenderAdapter};
pub use resource::{IdScheme, ResourceKind};
pub use session::Session;
pub use startup::Startup;
pub use state::ListState;
