//! Data models for the Foodgram application.

mod ingredient;
mod recipe;
mod subscription;
mod tag;
mod user;

pub use ingredient::*;
pub use recipe::*;
pub use subscription::*;
pub use tag::*;
pub use user::*;
