//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod alert_repo;
pub mod alert_rule_repo;
pub mod device_repo;
pub mod reading_repo;

pub use alert_repo::AlertRepo;
pub use alert_rule_repo::AlertRuleRepo;
pub use device_repo::DeviceRepo;
pub use reading_repo::ReadingRepo;
