use std::fmt;

/// Amounts are whole units of the bank's currency (or chips).
/// Positive values are deposits, negative values are withdrawals.
pub type Amount = i64;

/// Format an amount with an explicit sign, as shown in the history table.
/// Example: 100 -> "+100", -50 -> "-50", 0 -> "0"
pub fn format_signed(amount: Amount) -> String {
    if amount > 0 {
        format!("+{}", amount)
    } else {
        amount.to_string()
    }
}

/// Parse raw user input into an amount.
///
/// Accepts surrounding whitespace, an optional leading `+`/`-` sign, and single
/// `_` separators between digits ("1_000"). Anything else is rejected.
/// Example: " 100 " -> 100, "-50" -> -50, "+1_000" -> 1000
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let (negative, digits) = match input.as_bytes()[0] {
        b'-' => (true, &input[1..]),
        b'+' => (false, &input[1..]),
        _ => (false, input),
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(ParseAmountError::InvalidFormat);
    }

    let mut normalized = String::with_capacity(digits.len() + 1);
    if negative {
        normalized.push('-');
    }
    for c in digits.chars() {
        match c {
            '0'..='9' => normalized.push(c),
            '_' => {}
            _ => return Err(ParseAmountError::InvalidFormat),
        }
    }

    // Only digits and an optional sign remain, so a failure here is overflow
    normalized
        .parse()
        .map_err(|_| ParseAmountError::OutOfRange)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "amount is empty"),
            ParseAmountError::InvalidFormat => write!(f, "amount is not an integer"),
            ParseAmountError::OutOfRange => write!(f, "amount is out of range"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed(100), "+100");
        assert_eq!(format_signed(-50), "-50");
        assert_eq!(format_signed(0), "0");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100"), Ok(100));
        assert_eq!(parse_amount("-50"), Ok(-50));
        assert_eq!(parse_amount("+25"), Ok(25));
        assert_eq!(parse_amount("  42\n"), Ok(42));
        assert_eq!(parse_amount("1_000"), Ok(1000));
        assert_eq!(parse_amount("-1_000_000"), Ok(-1_000_000));
        assert_eq!(parse_amount("007"), Ok(7));
        assert_eq!(parse_amount("-0"), Ok(0));
    }

    #[test]
    fn test_parse_amount_bounds() {
        assert_eq!(parse_amount("9223372036854775807"), Ok(i64::MAX));
        assert_eq!(parse_amount("-9223372036854775808"), Ok(i64::MIN));
        assert_eq!(
            parse_amount("9223372036854775808"),
            Err(ParseAmountError::OutOfRange)
        );
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert_eq!(parse_amount(""), Err(ParseAmountError::Empty));
        assert_eq!(parse_amount("   "), Err(ParseAmountError::Empty));
        assert_eq!(parse_amount("abc"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("12.5"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("-"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("+-5"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("_100"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("100_"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("1__0"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("1 000"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("1e3"), Err(ParseAmountError::InvalidFormat));
    }
}
