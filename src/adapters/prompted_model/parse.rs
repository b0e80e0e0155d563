// Lenient parsing of free-form model output into typed results

use crate::domain::errors::DomainError;
use crate::domain::model::WindowIndex;

/// Sentinel meaning "no candidate in this chunk"
const NO_CANDIDATE: i64 = -1;

const MAX_TITLE_CHARS: usize = 100;

/// Parse a comma-separated list of window labels.
///
/// Tolerates whitespace, `[k]` brackets, a leading `OUTPUT` label, code
/// fences, and empty tokens. Any other non-integer token rejects the whole
/// response. The `-1` sentinel and other negative values are dropped.
pub fn parse_index_list(raw: &str) -> Result<Vec<WindowIndex>, DomainError> {
    let body = strip_output_label(raw.trim().trim_matches('`').trim());

    let tokens: Vec<&str> = body
        .split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err(DomainError::SelectionParse(format!(
            "expected comma-separated indices, got {:?}",
            raw
        )));
    }

    let mut indices = Vec::with_capacity(tokens.len());
    for token in tokens {
        let number = token
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim()
            .parse::<i64>()
            .map_err(|_| {
                DomainError::SelectionParse(format!(
                    "non-integer token {:?} in {:?}",
                    token, raw
                ))
            })?;
        if number == NO_CANDIDATE {
            continue;
        }
        if let Some(index) = WindowIndex::from_raw(number) {
            indices.push(index);
        }
    }
    Ok(indices)
}

/// Extract a single title line from model output
pub fn parse_title(raw: &str) -> Result<String, DomainError> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(strip_output_label)
        .unwrap_or_default();

    let line = match line.split_once(':') {
        Some((label, rest)) if label.trim().eq_ignore_ascii_case("title") => rest,
        _ => line,
    };

    let title: String = line
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*' | '“' | '”'))
        .trim()
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();

    if title.is_empty() {
        return Err(DomainError::SelectionParse(format!(
            "expected a title, got {:?}",
            raw
        )));
    }
    Ok(title)
}

fn strip_output_label(text: &str) -> &str {
    let trimmed = text.trim_start();
    match trimmed.get(..6) {
        Some(label) if label.eq_ignore_ascii_case("output") => {
            trimmed[6..].trim_start_matches(':').trim()
        }
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(raw: &str) -> Vec<u32> {
        parse_index_list(raw)
            .unwrap()
            .into_iter()
            .map(|index| index.0)
            .collect()
    }

    #[test]
    fn test_plain_list() {
        assert_eq!(indices("1,3"), vec![1, 3]);
        assert_eq!(indices(" 4 , 7 ,"), vec![4, 7]);
    }

    #[test]
    fn test_sentinel_is_dropped() {
        assert_eq!(indices("-1,3"), vec![3]);
        assert_eq!(indices("-1"), Vec::<u32>::new());
    }

    #[test]
    fn test_lenient_forms() {
        assert_eq!(indices("[2], [5]"), vec![2, 5]);
        assert_eq!(indices("OUTPUT\n1,3"), vec![1, 3]);
        assert_eq!(indices("Output: 6"), vec![6]);
        assert_eq!(indices("```\n8,9\n```"), vec![8, 9]);
    }

    #[test]
    fn test_other_negatives_are_dropped() {
        assert_eq!(indices("-4,2"), vec![2]);
    }

    #[test]
    fn test_non_integer_rejects_response() {
        assert!(matches!(
            parse_index_list("1, three"),
            Err(DomainError::SelectionParse(_))
        ));
        assert!(parse_index_list("I think 2 and 3").is_err());
    }

    #[test]
    fn test_empty_response_is_error() {
        assert!(parse_index_list("").is_err());
        assert!(parse_index_list(" , ,").is_err());
    }

    #[test]
    fn test_parse_title() {
        assert_eq!(parse_title("\"The Final Push\"").unwrap(), "The Final Push");
        assert_eq!(parse_title("Title: Comeback\nbecause...").unwrap(), "Comeback");
        assert_eq!(parse_title("\n  OUTPUT: **Big Win**").unwrap(), "Big Win");
        assert!(parse_title("   \n ").is_err());
    }
}
