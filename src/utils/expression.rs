//! Rule expression parsing and evaluation.
//!
//! Subscriptions configure rules as small comparison expressions over a
//! message's flattened attribute set, e.g. `sender == 'cosmos1abc'` or
//! `amount >= 1000000`. A list of expressions matches when at least one
//! expression matches (logical OR). A malformed expression is logged and
//! treated as a non-match so that an unevaluable rule fails closed.

use std::collections::HashMap;

use tracing::warn;

const OPERATORS: [&str; 9] = [
	"==",
	"!=",
	">=",
	"<=",
	">",
	"<",
	"contains",
	"starts_with",
	"ends_with",
];

/// Splits an expression into a (left, operator, right) tuple.
///
/// The operator is located while respecting single and double quotes;
/// surrounding quotes are stripped from the right-hand side.
pub fn split_expression(expr: &str) -> Option<(&str, &str, &str)> {
	let mut in_quotes = false;
	let mut operator_start = None;
	let mut operator_end = None;

	for (i, c) in expr.char_indices() {
		if c == '\'' || c == '"' {
			in_quotes = !in_quotes;
			continue;
		}

		if !in_quotes {
			for op in OPERATORS {
				if expr[i..].starts_with(op) {
					operator_start = Some(i);
					operator_end = Some(i + op.len());
					break;
				}
			}
			if operator_start.is_some() {
				break;
			}
		}
	}

	if let (Some(op_start), Some(op_end)) = (operator_start, operator_end) {
		let left = expr[..op_start].trim();
		let operator = expr[op_start..op_end].trim();
		let right = expr[op_end..].trim();
		let right = right.trim_matches(|c| c == '\'' || c == '"');

		if left.is_empty() || right.is_empty() {
			return None;
		}

		Some((left, operator, right))
	} else {
		None
	}
}

/// Evaluates one expression against an attribute set.
///
/// Comparison is numeric when both sides parse as integers, lexical
/// otherwise. Returns an error for a malformed expression or an unknown
/// attribute key.
pub fn evaluate_expression(
	attributes: &HashMap<String, String>,
	expr: &str,
) -> Result<bool, String> {
	let (key, operator, expected) =
		split_expression(expr).ok_or_else(|| format!("malformed expression: {}", expr))?;

	let actual = match attributes.get(key) {
		Some(value) => value,
		None => return Ok(false),
	};

	match operator {
		"==" => Ok(compare_values(actual, expected) == std::cmp::Ordering::Equal),
		"!=" => Ok(compare_values(actual, expected) != std::cmp::Ordering::Equal),
		">" => Ok(compare_values(actual, expected) == std::cmp::Ordering::Greater),
		"<" => Ok(compare_values(actual, expected) == std::cmp::Ordering::Less),
		">=" => Ok(compare_values(actual, expected) != std::cmp::Ordering::Less),
		"<=" => Ok(compare_values(actual, expected) != std::cmp::Ordering::Greater),
		"contains" => Ok(actual.contains(expected)),
		"starts_with" => Ok(actual.starts_with(expected)),
		"ends_with" => Ok(actual.ends_with(expected)),
		other => Err(format!("unsupported operator: {}", other)),
	}
}

fn compare_values(actual: &str, expected: &str) -> std::cmp::Ordering {
	match (actual.parse::<i128>(), expected.parse::<i128>()) {
		(Ok(a), Ok(b)) => a.cmp(&b),
		_ => actual.cmp(expected),
	}
}

/// Tests an attribute set against a list of expressions with OR
/// semantics. An empty list matches everything; a malformed expression
/// is logged and counts as a non-match.
pub fn matches_any(attributes: &HashMap<String, String>, expressions: &[String]) -> bool {
	if expressions.is_empty() {
		return true;
	}

	expressions.iter().any(|expr| {
		match evaluate_expression(attributes, expr) {
			Ok(matched) => matched,
			Err(reason) => {
				warn!(expression = expr.as_str(), reason, "Dropping message on unevaluable rule");
				false
			}
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn test_split_expression_with_quotes() {
		let (left, op, right) = split_expression("sender == 'cosmos1abc'").unwrap();
		assert_eq!(left, "sender");
		assert_eq!(op, "==");
		assert_eq!(right, "cosmos1abc");
	}

	#[test]
	fn test_split_expression_operator_inside_quotes_ignored() {
		let (left, op, right) = split_expression("memo == 'a == b'").unwrap();
		assert_eq!(left, "memo");
		assert_eq!(op, "==");
		assert_eq!(right, "a == b");
	}

	#[test]
	fn test_split_expression_malformed() {
		assert!(split_expression("no operator here").is_none());
		assert!(split_expression("== orphan").is_none());
	}

	#[test]
	fn test_numeric_comparison() {
		let attributes = attrs(&[("amount", "1000000")]);
		assert!(evaluate_expression(&attributes, "amount >= 1000000").unwrap());
		assert!(evaluate_expression(&attributes, "amount > 999999").unwrap());
		assert!(!evaluate_expression(&attributes, "amount < 1000000").unwrap());
		// Numeric, not lexical: "1000000" > "999999" numerically
		assert!(evaluate_expression(&attributes, "amount > 999999").unwrap());
	}

	#[test]
	fn test_string_operators() {
		let attributes = attrs(&[("sender", "cosmos1abcdef")]);
		assert!(evaluate_expression(&attributes, "sender starts_with 'cosmos1'").unwrap());
		assert!(evaluate_expression(&attributes, "sender contains 'abc'").unwrap());
		assert!(evaluate_expression(&attributes, "sender ends_with 'def'").unwrap());
		assert!(!evaluate_expression(&attributes, "sender != 'cosmos1abcdef'").unwrap());
	}

	#[test]
	fn test_unknown_attribute_is_non_match() {
		let attributes = attrs(&[("sender", "cosmos1abc")]);
		assert!(!evaluate_expression(&attributes, "recipient == 'cosmos1abc'").unwrap());
	}

	#[test]
	fn test_matches_any_or_semantics() {
		let attributes = attrs(&[("action", "transfer")]);
		let expressions = vec![
			"action == 'withdraw_reward'".to_string(),
			"action == 'transfer'".to_string(),
		];
		assert!(matches_any(&attributes, &expressions));
	}

	#[test]
	fn test_matches_any_empty_list_matches_all() {
		assert!(matches_any(&attrs(&[]), &[]));
	}

	#[tracing_test::traced_test]
	#[test]
	fn test_malformed_expression_fails_closed() {
		let attributes = attrs(&[("action", "transfer")]);
		assert!(!matches_any(&attributes, &["garbage".to_string()]));
		assert!(logs_contain("Dropping message on unevaluable rule"));
	}
}
