// Data ingestion (CSV upload) and egress (CSV export).
pub mod csv_parser;
pub mod export;
