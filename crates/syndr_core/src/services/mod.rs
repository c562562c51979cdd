//! Backend services for the SyndrDB client.
//!
//! - `session` - One authenticated stream connection and its query correlation
//! - `registry` - Live sessions by connection id, plus status notifications
//! - `driver` - The `DatabaseDriver` facade used by test procedures
//! - `catalog` - Test-definition files

pub mod catalog;
pub mod driver;
pub mod registry;
pub mod session;

pub use catalog::TestCatalog;
pub use driver::{DatabaseDriver, SyndrDriver};
pub use registry::ConnectionRegistry;
pub use session::Session;
