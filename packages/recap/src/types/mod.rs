pub mod artifact;
pub mod caption;
pub mod content;
pub mod site;
