pub mod health_service;
pub mod operator_directory;
pub mod qr_codec;
pub mod zip_packager;

pub use health_service::*;
pub use operator_directory::*;
pub use qr_codec::*;
pub use zip_packager::*;
