//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `advance` - One-off date advancement
//! - `core` - Database initialization and shared utilities (open_db)
//! - `detect` - Recurring pattern detection
//! - `distribute` - Budget distribution across categories
//! - `import` - CSV import
//! - `schedules` - Income source schedules (list with write-back, add)

pub mod advance;
pub mod core;
pub mod detect;
pub mod distribute;
pub mod import;
pub mod schedules;

// Re-export command functions for main.rs
pub use advance::*;
pub use core::*;
pub use detect::*;
pub use distribute::*;
pub use import::*;
pub use schedules::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
