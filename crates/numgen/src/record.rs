use crate::is_prime;

/// A persisted, classified value.
///
/// `is_prime` is derived by running [`is_prime`] on the value itself. Stored
/// negated primes are negative and therefore classified as *not* prime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Number {
    pub value: i32,
    pub is_prime: bool,
}

impl Number {
    pub const fn new(value: i32, is_prime: bool) -> Self {
        Self { value, is_prime }
    }

    /// Builds the record for `value` using the primality oracle.
    pub const fn classify(value: i32) -> Self {
        Self::new(value, is_prime(value))
    }

    /// The `0`/`1` flag used by integer-typed storage columns.
    pub const fn prime_flag(&self) -> i32 {
        self.is_prime as i32
    }

    /// Rebuilds a record from its storage form, or `None` if `flag` is
    /// neither `0` nor `1`.
    pub const fn from_flag(value: i32, flag: i32) -> Option<Self> {
        match flag {
            0 => Some(Self::new(value, false)),
            1 => Some(Self::new(value, true)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negated_primes_are_flagged_not_prime() {
        let record = Number::classify(-7);
        assert_eq!(record, Number::new(-7, false));
        assert_eq!(record.prime_flag(), 0);
    }

    #[test]
    fn flags_round_trip() {
        for value in [-2, 0, 1, 2, 97, 100] {
            let record = Number::classify(value);
            assert_eq!(Number::from_flag(value, record.prime_flag()), Some(record));
        }
        assert_eq!(Number::from_flag(5, 2), None);
        assert_eq!(Number::from_flag(5, -1), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_with_field_names() {
        let json = serde_json::to_string(&Number::classify(97)).unwrap();
        assert_eq!(json, r#"{"value":97,"is_prime":true}"#);
    }
}
