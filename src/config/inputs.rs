// ABOUTME: GitHub Actions style input provider.
// ABOUTME: Reads INPUT_<NAME> environment variables, including multi-line list inputs.

use crate::error::{Error, Result};

use super::ApiToken;

pub const TOKEN_INPUT: &str = "netlify-token";
pub const SITE_NAME_INPUT: &str = "site-name";
pub const SOURCE_FILE_INPUT: &str = "source-file";
pub const DESTINATION_PATH_INPUT: &str = "destination-path";

/// How an input should be read.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputOptions {
    pub required: bool,
    pub trim_whitespace: bool,
}

impl InputOptions {
    pub const REQUIRED: InputOptions = InputOptions {
        required: true,
        trim_whitespace: true,
    };
}

/// Environment variable holding the input `name`.
///
/// Whitespace becomes `_` and the name is upper-cased; hyphens are kept,
/// so `site-name` is read from `INPUT_SITE-NAME`.
pub fn input_key(name: &str) -> String {
    let normalized: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("INPUT_{}", normalized.to_uppercase())
}

/// Read a single-valued input.
///
/// A required input that is unset or blank fails with `MissingInput`.
pub fn get_input(name: &str, options: InputOptions) -> Result<String> {
    let raw = std::env::var(input_key(name)).unwrap_or_default();
    let value = if options.trim_whitespace {
        raw.trim().to_string()
    } else {
        raw
    };

    if options.required && value.trim().is_empty() {
        return Err(Error::MissingInput(name.to_string()));
    }

    Ok(value)
}

/// Read a multi-line input as one entry per non-empty line.
pub fn get_multiline_input(name: &str, options: InputOptions) -> Result<Vec<String>> {
    let value = get_input(
        name,
        InputOptions {
            required: options.required,
            trim_whitespace: false,
        },
    )?;

    let lines: Vec<String> = value
        .lines()
        .map(|line| {
            if options.trim_whitespace {
                line.trim().to_string()
            } else {
                line.to_string()
            }
        })
        .filter(|line| !line.trim().is_empty())
        .collect();

    if options.required && lines.is_empty() {
        return Err(Error::MissingInput(name.to_string()));
    }

    Ok(lines)
}

/// The four inputs the action is invoked with.
#[derive(Debug, Clone)]
pub struct ActionInputs {
    pub token: ApiToken,
    pub site_name: String,
    pub source_files: Vec<String>,
    pub destination_paths: Vec<String>,
}

impl ActionInputs {
    /// Read every input from the environment.
    ///
    /// `on_token` runs as soon as the token is known, before any other
    /// input is validated, so it can be masked from all later output.
    pub fn from_env(on_token: impl FnOnce(&ApiToken)) -> Result<Self> {
        let token = ApiToken::new(get_input(TOKEN_INPUT, InputOptions::REQUIRED)?);
        on_token(&token);

        Ok(Self {
            token,
            site_name: get_input(SITE_NAME_INPUT, InputOptions::REQUIRED)?,
            source_files: get_multiline_input(SOURCE_FILE_INPUT, InputOptions::REQUIRED)?,
            destination_paths: get_multiline_input(DESTINATION_PATH_INPUT, InputOptions::REQUIRED)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_key_normalizes_name() {
        assert_eq!(input_key("site-name"), "INPUT_SITE-NAME");
        assert_eq!(input_key("my input"), "INPUT_MY_INPUT");
    }

    #[test]
    fn required_input_missing() {
        temp_env::with_var_unset("INPUT_UNIT-MISSING", || {
            let err = get_input("unit-missing", InputOptions::REQUIRED).unwrap_err();
            assert!(matches!(err, Error::MissingInput(ref name) if name == "unit-missing"));
        });
    }

    #[test]
    fn optional_input_defaults_to_empty() {
        temp_env::with_var_unset("INPUT_UNIT-OPTIONAL", || {
            let value = get_input("unit-optional", InputOptions::default()).unwrap();
            assert!(value.is_empty());
        });
    }

    #[test]
    fn whitespace_is_trimmed_on_request() {
        temp_env::with_var("INPUT_UNIT-TRIM", Some("  demo \n"), || {
            assert_eq!(get_input("unit-trim", InputOptions::REQUIRED).unwrap(), "demo");
            assert_eq!(
                get_input("unit-trim", InputOptions::default()).unwrap(),
                "  demo \n"
            );
        });
    }

    #[test]
    fn blank_required_input_is_missing() {
        temp_env::with_var("INPUT_UNIT-BLANK", Some("   "), || {
            assert!(get_input("unit-blank", InputOptions::REQUIRED).is_err());
        });
    }

    #[test]
    fn multiline_input_drops_blank_lines() {
        temp_env::with_var("INPUT_UNIT-LINES", Some(" a.txt\n\n b/c.txt \n"), || {
            let lines = get_multiline_input("unit-lines", InputOptions::REQUIRED).unwrap();
            assert_eq!(lines, vec!["a.txt", "b/c.txt"]);
        });
    }
}
