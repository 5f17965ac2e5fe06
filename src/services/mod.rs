pub mod ingest;
pub mod m3u_parser;
pub mod metrics;
pub mod query;
pub mod reference_data;
pub mod store;
