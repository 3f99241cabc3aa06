pub mod config;
pub mod device;
pub mod error;
pub mod format;
pub mod lexicon;
pub mod result_code;
pub mod state;
