pub mod migrate;
pub mod superadmin;
pub mod token;
