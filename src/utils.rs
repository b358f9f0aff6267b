//! Utility functions for directory management and number display
//!
//! Directories follow the XDG Base Directory specification:
//!
//! - Data: `~/.local/share/mcucalc/` - Saved CLI configuration
//!
//! # Example
//!
//! ```
//! use mcucalc::utils::group_thousands;
//!
//! assert_eq!(group_thousands(16385u64), "16,385");
//! ```

use directories::ProjectDirs;
use std::path::PathBuf;

pub fn get_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "mcucalc", "mcucalc").map(|pd| pd.data_dir().to_path_buf())
}

pub fn ensure_data_dir() -> std::io::Result<PathBuf> {
    let dir = get_data_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Data directory not found")
    })?;

    #[cfg(unix)]
    {
        use std::fs::DirBuilder;
        use std::os::unix::fs::DirBuilderExt;

        DirBuilder::new()
            .mode(0o700) // User read/write/execute only
            .recursive(true)
            .create(&dir)?;
    }

    #[cfg(not(unix))]
    std::fs::create_dir_all(&dir)?;

    Ok(dir)
}

/// Formats an integer with `,` between groups of three digits.
pub fn group_thousands(value: impl Into<u128>) -> String {
    let digits = value.into().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0u64), "0");
        assert_eq!(group_thousands(999u64), "999");
        assert_eq!(group_thousands(1000u64), "1,000");
        assert_eq!(group_thousands(131_080u64), "131,080");
        assert_eq!(group_thousands(u64::MAX), "18,446,744,073,709,551,615");
    }

    #[test]
    fn test_group_thousands_wide() {
        assert_eq!(
            group_thousands(u128::from(u64::MAX) * 8),
            "147,573,952,589,676,412,920"
        );
    }
}
