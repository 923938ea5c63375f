//! Front ends: the HTTP API, scanner payload ingestion, CSV replay and seed loading.

pub mod csv;
pub mod http;
pub mod scan;
pub mod seed;
