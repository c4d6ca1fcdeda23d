// Network adapter modules split by the renderer socket vs control HTTP routes.

pub mod client;
pub mod control;

pub use client::{world_update_serializer, ws_handler};
pub use control::{reset_handler, telemetry_handler};
