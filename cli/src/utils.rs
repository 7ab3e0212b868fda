use anyhow::{Context, Result};
use std::str::FromStr;

/// Parses a comma separated list such as `1000,2000,5000`.
pub fn parse_list<T>(input: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<T>()
                .with_context(|| format!("Failed to parse '{}' in list '{}'", part, input))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counts() {
        let counts: Vec<usize> = parse_list("1000, 2000,5000").unwrap();
        assert_eq!(counts, vec![1000, 2000, 5000]);
    }

    #[test]
    fn test_parse_alphas() {
        let alphas: Vec<f64> = parse_list("0.6,0.75,").unwrap();
        assert_eq!(alphas, vec![0.6, 0.75]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_list::<usize>("10,abc").is_err());
    }
}
