//! API Routes
//!
//! Route handlers organized by functionality.

pub mod analytics;
pub mod backup;
pub mod entries;
pub mod health;
pub mod library;
