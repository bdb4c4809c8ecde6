// Account registry backing chat saves: signup, login, password reset lookups.

pub mod directory;
pub mod handlers;

pub use directory::{AuthError, SignupForm, UserDirectory};
