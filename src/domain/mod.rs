mod attendance;
mod guest_email;
mod submission;
pub use attendance::Attendance;
pub use guest_email::GuestEmail;
pub use submission::Submission;
