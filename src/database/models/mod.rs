pub mod admin;
pub mod email_change;
pub mod highlight;
pub mod news;
pub mod notification;
pub mod organization;
pub mod password_reset;
pub mod program;
pub mod submission;
pub mod subscriber;
pub mod superadmin;
pub mod volunteer;
