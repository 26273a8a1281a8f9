// farmconnect/src/services/mod.rs

pub mod cart;
pub mod catalog_seed;
pub mod checkout_service;
pub mod money;
pub mod sessions;
pub mod splitter;
