pub mod guild;
pub mod period;
pub mod submission;
