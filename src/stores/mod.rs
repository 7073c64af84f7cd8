//! Flat-file persistence: the Account Store (C2) and the Mail/Offline-Tell
//! stores (C7). Each owns its own file and its own write-then-rename
//! discipline, independent of the World Store and of each other.

pub mod accounts;
pub mod mail;
pub mod tells;

pub use accounts::AccountStore;
pub use mail::MailStore;
pub use tells::TellStore;
