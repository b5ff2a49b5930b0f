pub mod auth;
pub mod favorite_store;
pub mod favorites;
