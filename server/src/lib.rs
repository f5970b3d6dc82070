pub mod api;
pub mod components;
pub mod cookies;
pub mod errors;
pub mod feed;
pub mod oauth;
pub mod routes;
pub mod session;
pub mod setup;
pub mod state;
