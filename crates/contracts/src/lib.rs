//! Общие типы между backend и клиентами API каталога товаров

pub mod domain;
pub mod shared;
