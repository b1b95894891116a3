//! Session authority module
//!
//! Issues linked access/refresh pairs, rotates them on refresh and validates
//! presented access tokens against the store, the signer and the IP scope.

mod locks;
mod service;

#[cfg(test)]
mod tests;

pub use locks::UserLocks;
pub use service::SessionService;
