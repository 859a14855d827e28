//! Read-only views for the admin dashboard. Writes made by admins live with
//! the entity they touch (campaigns, fundraiser requests, roles).

pub mod endpoints;
pub mod manager;
pub use endpoints::*;
