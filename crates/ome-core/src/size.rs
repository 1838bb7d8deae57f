//! Model parameter-size strings ("7B", "1.5B", "70B", "1T").

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid model size '{0}': expected a decimal with optional K/M/B/T suffix")]
pub struct SizeError(pub String);

/// Parse a suffix-scaled decimal into an absolute parameter count.
pub fn parse_model_size(input: &str) -> Result<f64, SizeError> {
    let trimmed = input.trim();
    let (digits, multiplier) = match trimmed.chars().last() {
        Some('T' | 't') => (&trimmed[..trimmed.len() - 1], 1e12),
        Some('B' | 'b') => (&trimmed[..trimmed.len() - 1], 1e9),
        Some('M' | 'm') => (&trimmed[..trimmed.len() - 1], 1e6),
        Some('K' | 'k') => (&trimmed[..trimmed.len() - 1], 1e3),
        _ => (trimmed, 1.0),
    };

    let value: f64 = digits
        .trim()
        .parse()
        .map_err(|_| SizeError(input.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(SizeError(input.to_string()));
    }
    Ok(value * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffixes() {
        assert_eq!(parse_model_size("7B").unwrap(), 7e9);
        assert_eq!(parse_model_size("1.5B").unwrap(), 1.5e9);
        assert_eq!(parse_model_size("70B").unwrap(), 70e9);
        assert_eq!(parse_model_size("1T").unwrap(), 1e12);
        assert_eq!(parse_model_size("350M").unwrap(), 350e6);
        assert_eq!(parse_model_size("125k").unwrap(), 125e3);
    }

    #[test]
    fn parses_bare_numbers() {
        assert_eq!(parse_model_size("1000").unwrap(), 1000.0);
    }

    #[test]
    fn rejects_invalid() {
        assert!(parse_model_size("").is_err());
        assert!(parse_model_size("B").is_err());
        assert!(parse_model_size("seven billion").is_err());
        assert!(parse_model_size("-7B").is_err());
        assert!(parse_model_size("NaNB").is_err());
    }
}
