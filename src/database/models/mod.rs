pub mod course;
pub mod entitlement;

pub use course::Course;
pub use entitlement::Entitlement;
