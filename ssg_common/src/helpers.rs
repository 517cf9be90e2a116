use std::str::FromStr;

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Read an environment variable and parse it, falling back to the given default when the variable is unset or does
/// not parse. The caller supplies the logging, since this crate stays free of a logger dependency.
pub fn env_or<T: FromStr>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(s) => s.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn boolean_flags_parse_common_spellings() {
        assert!(parse_boolean_flag(Some("1".into()), false));
        assert!(parse_boolean_flag(Some("Yes".into()), false));
        assert!(!parse_boolean_flag(Some("off".into()), true));
        assert!(parse_boolean_flag(None, true));
        assert!(!parse_boolean_flag(Some("whatever".into()), false));
    }

    #[test]
    fn env_or_falls_back_on_garbage() {
        std::env::set_var("SSG_TEST_ENV_OR", "not-a-number");
        assert_eq!(env_or("SSG_TEST_ENV_OR", 42u64), 42);
        std::env::set_var("SSG_TEST_ENV_OR", "17");
        assert_eq!(env_or("SSG_TEST_ENV_OR", 42u64), 17);
        std::env::remove_var("SSG_TEST_ENV_OR");
    }
}
