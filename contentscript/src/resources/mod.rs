pub mod identity_client;
pub mod pages;
pub mod quota_store;
pub mod resource;
