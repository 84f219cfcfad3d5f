pub mod line_scanner;

pub use line_scanner::*;
