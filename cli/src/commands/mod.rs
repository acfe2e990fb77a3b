//! Command implementations

pub mod certs;
pub mod disk;
pub mod proxy_check;
pub mod render_proxy;
pub mod start;
pub mod version;
pub mod wait_ssh;
