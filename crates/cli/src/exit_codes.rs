//! CLI Exit Code Registry
//!
//! Single source of truth for `netrecon` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (including a search with no matches)         |
//! | 1    | General error                                        |
//! | 2    | Usage error (bad args, empty query, unknown field)   |
//! | 3    | Config file unreadable or invalid                    |
//! | 4    | No input file could be loaded into any pool          |
//! | 5    | Output file could not be written                     |

use netrecon_core::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, empty search value, unknown field or parameter.
pub const EXIT_USAGE: u8 = 2;

/// `--config` file missing, malformed or failing validation.
pub const EXIT_CONFIG: u8 = 3;

/// Every input file was skipped or unclassifiable.
pub const EXIT_NO_DATA: u8 = 4;

/// Writing the report or change-request file failed.
pub const EXIT_WRITE: u8 = 5;

/// Map a core error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    if err.is_usage() {
        return EXIT_USAGE;
    }
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::UnknownTechnology(_) => EXIT_USAGE,
        ReconError::Io(_) => EXIT_WRITE,
        _ => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_map_to_usage() {
        assert_eq!(recon_exit_code(&ReconError::EmptyQuery), EXIT_USAGE);
        assert_eq!(
            recon_exit_code(&ReconError::UnknownField {
                technology: "lte".into(),
                field: "X".into()
            }),
            EXIT_USAGE
        );
        assert_eq!(recon_exit_code(&ReconError::UnknownTechnology("umts".into())), EXIT_USAGE);
    }

    #[test]
    fn config_errors_map_to_config() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_CONFIG);
        assert_eq!(recon_exit_code(&ReconError::ConfigValidation("x".into())), EXIT_CONFIG);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_CONFIG, EXIT_NO_DATA, EXIT_WRITE];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
