pub mod event;
pub mod family;
pub mod message;
pub mod preparation;
pub mod user;
