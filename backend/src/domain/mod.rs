//! Domain layer: the pure scheduling/visibility core plus one service
//! per aggregate. Services hold repositories and enforce family
//! ownership; the core modules are side-effect free.

pub mod dday;
pub mod event_service;
pub mod family_service;
pub mod ids;
pub mod message_service;
pub mod models;
pub mod occurrence;
pub mod preparation_service;
pub mod recurrence;
pub mod user_service;
pub mod visibility;
