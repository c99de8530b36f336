// Adapters layer: concrete sources, stores and filters behind the domain ports.

pub mod csv_storage;
pub mod filter;
pub mod http;
pub mod seed_list;
pub mod sources;
