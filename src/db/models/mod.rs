mod elderly_profile;
mod nurse_availability;
mod nurse_profile;
mod walk_session;

pub use elderly_profile::*;
pub use nurse_availability::*;
pub use nurse_profile::*;
pub use walk_session::*;
