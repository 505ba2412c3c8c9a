//! Profile Manager: building, merging and persisting user profiles

pub mod manager;

pub use manager::ProfileManager;
