pub mod attendance;
pub mod classes;
pub mod dates;
pub mod report;
