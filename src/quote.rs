use serde_json::Value;

use crate::error::GasError;

/// Result of one oracle fetch, ready for the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GasQuote {
    Prices { safe: String, fast: String },
    /// Sentinel text repeated in both slots ("HTTP Error", "Parse Error", "API Error")
    Unavailable(&'static str),
}

impl GasQuote {
    /// Decode an oracle response body of the shape
    /// `{"status":"1","result":{"SafeGasPrice":"..","FastGasPrice":".."}}`.
    pub fn from_response(text: &str) -> Result<Self, GasError> {
        let json: Value = serde_json::from_str(text)?;

        if json.get("status").and_then(Value::as_str) != Some("1") {
            return Err(GasError::Api);
        }
        let result = json
            .get("result")
            .and_then(Value::as_object)
            .ok_or(GasError::Api)?;

        let safe = result.get("SafeGasPrice").and_then(price_value);
        let fast = result.get("FastGasPrice").and_then(price_value);
        match (safe, fast) {
            (Some(safe), Some(fast)) => Ok(GasQuote::Prices {
                safe: format_price(safe),
                fast: format_price(fast),
            }),
            _ => Err(GasError::Api),
        }
    }

    pub fn safe(&self) -> &str {
        match self {
            GasQuote::Prices { safe, .. } => safe,
            GasQuote::Unavailable(sentinel) => sentinel,
        }
    }

    pub fn fast(&self) -> &str {
        match self {
            GasQuote::Prices { fast, .. } => fast,
            GasQuote::Unavailable(sentinel) => sentinel,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, GasQuote::Prices { .. })
    }

    pub fn label(&self) -> String {
        format!("Safe {} / Fast {}", self.safe(), self.fast())
    }
}

impl From<&GasError> for GasQuote {
    fn from(err: &GasError) -> Self {
        GasQuote::Unavailable(err.sentinel())
    }
}

/// Two fractional digits, e.g. `12.3` -> `"12.30"`.
///
/// Rounds the exact binary value, with ties going away from zero: `1.125`
/// (exactly representable) gives `"1.13"`, while `1.005` (stored just below
/// the tie) gives `"1.00"`.
pub fn format_price(value: f64) -> String {
    match hundredths(value.abs()) {
        Some(cents) => {
            let sign = if value < 0.0 { "-" } else { "" };
            format!("{}{}.{:02}", sign, cents / 100, cents % 100)
        }
        // whole numbers and non-finite values have nothing to round
        None => format!("{:.2}", value),
    }
}

/// `round(x * 100)` computed exactly from the mantissa, for non-negative
/// `x` with a fractional part. `None` when `x` is a whole number or not finite.
fn hundredths(x: f64) -> Option<u128> {
    if !x.is_finite() {
        return None;
    }
    let bits = x.to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let frac = bits & ((1u64 << 52) - 1);
    let (mantissa, exp) = if exp_bits == 0 {
        (frac, -1074)
    } else {
        (frac | (1u64 << 52), exp_bits - 1075)
    };
    if exp >= 0 {
        return None;
    }

    // x * 100 = mantissa * 100 / 2^shift, with mantissa * 100 < 2^60
    let shift = (-exp) as u32;
    if shift > 64 {
        return Some(0);
    }
    let scaled = mantissa as u128 * 100;
    let quotient = scaled >> shift;
    let remainder = scaled & ((1u128 << shift) - 1);
    let half = 1u128 << (shift - 1);
    Some(if remainder >= half { quotient + 1 } else { quotient })
}

// The oracle sends prices as strings, but accept plain JSON numbers too.
// Narrower than a prefix parse: "12.3 gwei" is rejected rather than read as
// 12.3, and a numeric 0 counts as a price.
fn price_value(v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_response_is_formatted_to_two_digits() {
        let quote = GasQuote::from_response(
            r#"{"status":"1","result":{"SafeGasPrice":"12.3","FastGasPrice":"45"}}"#,
        )
        .unwrap();
        assert_eq!(quote.safe(), "12.30");
        assert_eq!(quote.fast(), "45.00");
        assert_eq!(quote.label(), "Safe 12.30 / Fast 45.00");
        assert!(quote.is_available());
    }

    #[test]
    fn extra_precision_is_rounded() {
        let body = r#"{"status":"1","message":"OK","result":{"LastBlock":"19000000",
            "SafeGasPrice":"0.716","ProposeGasPrice":"0.8","FastGasPrice":"1.2049"}}"#;
        let quote = GasQuote::from_response(body).unwrap();
        assert_eq!(quote.safe(), "0.72");
        assert_eq!(quote.fast(), "1.20");
    }

    #[test]
    fn exact_half_cents_round_away_from_zero() {
        let quote = GasQuote::from_response(
            r#"{"status":"1","result":{"SafeGasPrice":"1.125","FastGasPrice":"0.625"}}"#,
        )
        .unwrap();
        assert_eq!(quote.safe(), "1.13");
        assert_eq!(quote.fast(), "0.63");
    }

    #[test]
    fn format_price_rounds_the_stored_value() {
        // 1.005 and 2.675 are stored just below the tie
        assert_eq!(format_price(1.005), "1.00");
        assert_eq!(format_price(2.675), "2.67");
        assert_eq!(format_price(0.375), "0.38");
        assert_eq!(format_price(0.995), "0.99");
        assert_eq!(format_price(9.996), "10.00");
        assert_eq!(format_price(12.3), "12.30");
        assert_eq!(format_price(45.0), "45.00");
        assert_eq!(format_price(0.0), "0.00");
        assert_eq!(format_price(0.0004), "0.00");
        assert_eq!(format_price(1e-300), "0.00");
        assert_eq!(format_price(-1.125), "-1.13");
    }

    #[test]
    fn numeric_fields_are_accepted() {
        let quote = GasQuote::from_response(
            r#"{"status":"1","result":{"SafeGasPrice":7,"FastGasPrice":9.5}}"#,
        )
        .unwrap();
        assert_eq!(quote.label(), "Safe 7.00 / Fast 9.50");
    }

    #[test]
    fn prices_must_be_plain_numbers() {
        let body = r#"{"status":"1","result":{"SafeGasPrice":"12.3 gwei","FastGasPrice":"45"}}"#;
        assert!(matches!(GasQuote::from_response(body), Err(GasError::Api)));

        let body = r#"{"status":"1","result":{"SafeGasPrice":0,"FastGasPrice":" 1.5 "}}"#;
        assert_eq!(GasQuote::from_response(body).unwrap().label(), "Safe 0.00 / Fast 1.50");
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = GasQuote::from_response("not json").unwrap_err();
        assert!(matches!(err, GasError::Parse(_)));
        assert_eq!(GasQuote::from(&err).label(), "Safe Parse Error / Fast Parse Error");
    }

    #[test]
    fn missing_fields_are_an_api_error() {
        let err = GasQuote::from_response(r#"{"status":"1","result":{}}"#).unwrap_err();
        assert!(matches!(err, GasError::Api));
        assert_eq!(GasQuote::from(&err), GasQuote::Unavailable("API Error"));
    }

    #[test]
    fn failed_status_is_an_api_error() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#;
        assert!(matches!(GasQuote::from_response(body), Err(GasError::Api)));
        // status must be the string "1", not the number
        let body = r#"{"status":1,"result":{"SafeGasPrice":"1","FastGasPrice":"2"}}"#;
        assert!(matches!(GasQuote::from_response(body), Err(GasError::Api)));
    }

    #[test]
    fn empty_or_non_numeric_prices_are_rejected() {
        for body in [
            r#"{"status":"1","result":{"SafeGasPrice":"","FastGasPrice":"2"}}"#,
            r#"{"status":"1","result":{"SafeGasPrice":"abc","FastGasPrice":"2"}}"#,
            r#"{"status":"1","result":{"SafeGasPrice":"NaN","FastGasPrice":"2"}}"#,
            r#"{"status":"1","result":{"SafeGasPrice":"1","FastGasPrice":null}}"#,
        ] {
            assert!(matches!(GasQuote::from_response(body), Err(GasError::Api)), "{body}");
        }
    }
}
