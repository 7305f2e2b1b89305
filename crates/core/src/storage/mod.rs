pub mod file;

pub use file::LedgerFile;
