mod health_check;
mod submit_signup;
mod test_sheets;

pub use health_check::*;
pub use submit_signup::*;
pub use test_sheets::*;
