pub mod signup_email;
pub mod signup_name;
pub mod signup_record;
