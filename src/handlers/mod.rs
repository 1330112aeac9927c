pub mod enroll;
pub mod enrollments;
