//! Platform command profiles for multi-vendor support.
//!
//! Each platform identifier maps to a [`CommandProfile`] describing which
//! commands to send and how to recognise pagination, login prompts and the
//! end of output.

mod profile;
mod registry;
pub mod vendors;

pub use profile::{
    ApiExport, CommandProfile, Delivery, InteractiveScript, LoginResponse, LoginStep, Pagination,
};
pub use registry::{ProfileLookup, ProfileRegistry};
