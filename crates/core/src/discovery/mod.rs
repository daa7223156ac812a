pub mod file_finder;
