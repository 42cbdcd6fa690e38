//! Ordered request parameters and their signable encoding.
//!
//! The encoded form of a [`Params`] bag is both the request body and the
//! message the request signature is computed over, so the encoding must be
//! byte-for-byte reproducible: pairs are emitted in insertion order using
//! standard `application/x-www-form-urlencoded` escaping.

use url::form_urlencoded;

/// An ordered, append-only bag of request parameters.
///
/// Keys are unique. Appending a key that is already present is refused and
/// leaves the bag unchanged, so a value can never be silently overridden
/// after it was placed.
///
/// # Example
///
/// ```rust
/// use coinpay::Params;
///
/// let mut params = Params::new();
/// params.append("currency", "BTC");
/// params.append_opt("ipn_url", None::<&str>);
/// params.append_flag("all", true);
///
/// assert_eq!(params.encode(), "currency=BTC&all=1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Creates an empty parameter bag.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends `key=value`.
    ///
    /// Returns `false` (and appends nothing) if `key` is already present.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.0.push((key, value.into()));
        true
    }

    /// Appends `key=value` only when `value` is present and non-empty.
    ///
    /// Empty optional fields are omitted from the request entirely rather
    /// than sent as empty strings.
    pub fn append_opt<S: AsRef<str>>(&mut self, key: impl Into<String>, value: Option<S>) -> bool {
        match value {
            Some(value) if !value.as_ref().is_empty() => self.append(key, value.as_ref()),
            _ => false,
        }
    }

    /// Appends `key=1` when `flag` is set; does nothing otherwise.
    pub fn append_flag(&mut self, key: impl Into<String>, flag: bool) -> bool {
        flag && self.append(key, "1")
    }

    /// Builder-style [`Params::append`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Number of parameters in the bag.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the bag holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encodes the bag as an `&`-joined, percent-encoded form string.
    ///
    /// This is the signable message: the same bag always encodes to the same
    /// bytes.
    #[must_use]
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.append(key, value);
        }
        params
    }
}
