//! Browser control implementations.

pub mod cdp;

pub use cdp::CdpBrowser;
