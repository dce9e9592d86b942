pub mod in_memory;
pub mod repository;
pub mod service;
pub mod store;

#[cfg(test)]
mod contract_tests;
