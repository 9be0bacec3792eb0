// handlers/elevated - /api/superadmin/*, platform-wide management

pub mod account;
pub mod management;
pub mod notifications;
pub mod submissions;
