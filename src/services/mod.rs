pub mod csv_import;
pub mod invites;
pub mod join_links;
pub mod mail;
pub mod org_admin;
pub mod organisations;
pub mod scheduler;
pub mod security;
pub mod session;
pub mod user_groups;
pub mod users;

pub use mail::{build_mailer, Mailer, OutgoingMail};
pub use scheduler::start_scheduler;
pub use security::*;
