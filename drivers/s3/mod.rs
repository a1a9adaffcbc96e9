//! S3对象存储驱动 / S3 object storage driver

pub mod config;
pub mod driver;
pub mod factory;

pub use config::S3Config;
pub use driver::S3Driver;
pub use factory::S3DriverFactory;
