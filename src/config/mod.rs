//! Configuration module

mod site;

pub use site::BlogConfig;
pub use site::ContactConfig;
pub use site::HighlightConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
