pub mod race_summary;
