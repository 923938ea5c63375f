pub mod outcome_writer;
pub mod scan_reader;
