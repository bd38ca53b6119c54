pub mod ip_extraction;
pub mod upload;

pub use ip_extraction::ClientIp;
