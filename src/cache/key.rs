//! Key Normalization
//!
//! Keys are strings or numbers, coerced to their string form at the API
//! boundary. Other types do not implement [`CacheKey`] and are rejected at
//! compile time.

// == Cache Key ==
/// A type usable as a cache key.
pub trait CacheKey {
    /// Returns the string form of the key.
    fn to_key(&self) -> String;
}

impl CacheKey for str {
    fn to_key(&self) -> String {
        self.to_string()
    }
}

impl CacheKey for String {
    fn to_key(&self) -> String {
        self.clone()
    }
}

impl<T: CacheKey + ?Sized> CacheKey for &T {
    fn to_key(&self) -> String {
        (**self).to_key()
    }
}

macro_rules! impl_integer_key {
    ($($t:ty),*) => {
        $(impl CacheKey for $t {
            fn to_key(&self) -> String {
                self.to_string()
            }
        })*
    };
}

impl_integer_key!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl CacheKey for f64 {
    fn to_key(&self) -> String {
        if self.is_nan() {
            "NaN".to_string()
        } else if *self == f64::INFINITY {
            "Infinity".to_string()
        } else if *self == f64::NEG_INFINITY {
            "-Infinity".to_string()
        } else if *self == 0.0 {
            "0".to_string()
        } else if self.abs() >= 1e21 || self.abs() < 1e-6 {
            exponent_form(*self)
        } else {
            self.to_string()
        }
    }
}

// Shortest digits in the "1.5e+21" / "1e-7" form numbers take outside
// the plain decimal range.
fn exponent_form(n: f64) -> String {
    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

impl CacheKey for f32 {
    fn to_key(&self) -> String {
        f64::from(*self).to_key()
    }
}

// == Normalize ==
/// Coerces a key to its string form; the empty string yields None.
pub fn normalize_key<K: CacheKey + ?Sized>(key: &K) -> Option<String> {
    let key = key.to_key();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_keys() {
        assert_eq!(normalize_key("foo"), Some("foo".to_string()));
        assert_eq!(normalize_key(&"foo".to_string()), Some("foo".to_string()));
        assert_eq!(normalize_key(""), None);
        assert_eq!(normalize_key(&String::new()), None);
    }

    #[test]
    fn test_integer_keys() {
        assert_eq!(normalize_key(&42), Some("42".to_string()));
        assert_eq!(normalize_key(&-7i64), Some("-7".to_string()));
        assert_eq!(normalize_key(&0u8), Some("0".to_string()));
    }

    #[test]
    fn test_float_keys() {
        assert_eq!(normalize_key(&1.0), Some("1".to_string()));
        assert_eq!(normalize_key(&1.5), Some("1.5".to_string()));
        assert_eq!(normalize_key(&-0.0), Some("0".to_string()));
        assert_eq!(normalize_key(&f64::NAN), Some("NaN".to_string()));
        assert_eq!(normalize_key(&f64::NEG_INFINITY), Some("-Infinity".to_string()));
    }

    #[test]
    fn test_float_keys_in_exponent_range() {
        assert_eq!(normalize_key(&1e21), Some("1e+21".to_string()));
        assert_eq!(normalize_key(&-1.5e22), Some("-1.5e+22".to_string()));
        assert_eq!(normalize_key(&1e20), Some("100000000000000000000".to_string()));
        assert_eq!(normalize_key(&1e-7), Some("1e-7".to_string()));
        assert_eq!(normalize_key(&2.5e-8), Some("2.5e-8".to_string()));
        assert_eq!(normalize_key(&1e-6), Some("0.000001".to_string()));
    }

    #[test]
    fn test_number_and_string_share_a_slot() {
        assert_eq!(normalize_key(&12), normalize_key("12"));
    }
}
