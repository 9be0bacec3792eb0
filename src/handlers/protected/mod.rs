// handlers/protected - /api/admin/*, scoped to the admin's own organization

pub mod account;
pub mod content;
pub mod notifications;
pub mod submissions;
