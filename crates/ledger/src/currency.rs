use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// ISO currency code of an account.
///
/// The ledger never converts between currencies: a transfer is only valid
/// between accounts holding the same currency, and checking that is the
/// caller's job.
///
/// ## Minor units
///
/// Balances and amounts are stored as an `i64` number of **minor units**.
/// `minor_units()` returns how many decimal digits separate major from minor
/// units, e.g. `10.50 USD` is stored as `1050`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Cad,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Eur, Currency::Cad];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Cad => "CAD",
        }
    }

    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Usd | Currency::Eur | Currency::Cad => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "CAD" => Ok(Currency::Cad),
            other => Err(LedgerError::InvalidArgument(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

impl core::str::FromStr for Currency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_codes_case_insensitively() {
        assert_eq!(Currency::try_from("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::try_from(" EUR ").unwrap(), Currency::Eur);
        assert_eq!("Cad".parse::<Currency>().unwrap(), Currency::Cad);
    }

    #[test]
    fn rejects_unknown_codes() {
        let err = Currency::try_from("GBP").unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidArgument("unsupported currency: GBP".to_string())
        );
    }

    #[test]
    fn code_round_trips_through_display() {
        for currency in Currency::ALL {
            assert_eq!(currency.to_string().parse::<Currency>().unwrap(), currency);
        }
    }
}
