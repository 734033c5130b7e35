//! # Handlers
//!
//! One [`LifecycleHandler`](crate::lifecycle::LifecycleHandler) per custom-resource type.
//! Handlers hold their remote clients behind the provider traits and never cache application
//! state between invocations.

mod app_start;
mod copy_assets;
mod datagen;
mod java_app;
mod notebook_run;
mod studio_app;

pub use app_start::AppStartHandler;
pub use copy_assets::{asset_key, check_asset_allowed, CopyAssetsHandler};
pub use datagen::DataGenHandler;
pub use java_app::JavaAppHandler;
pub use notebook_run::{job_url, render_note_result, NotebookRunHandler};
pub use studio_app::{studio_create_request, StudioAppHandler};
