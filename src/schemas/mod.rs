pub mod auth;
pub mod csv_import;
pub mod group;
pub mod invite;
pub mod join_link;
pub mod organisation;
pub mod page;

pub use auth::*;
pub use csv_import::*;
pub use group::*;
pub use invite::*;
pub use join_link::*;
pub use organisation::*;
pub use page::*;
