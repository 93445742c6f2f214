use std::{fmt, slice};

/// A single path parameter, consisting of a key and a value.
#[derive(PartialEq, Eq, Clone, Debug)]
struct Param {
    key: String,
    value: String,
}

/// The path parameters extracted by a route match.
///
/// Parameters are kept in the order they appear in the route pattern.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = sprig::Node::new();
/// tree.insert("/users/:id", true)?;
///
/// let matched = tree.at("/users/1")?;
///
/// // Iterate through the keys and values.
/// for (key, value) in matched.params.iter() {
///     println!("key: {}, value: {}", key, value);
/// }
///
/// // Get a specific value by name.
/// assert_eq!(matched.params.get("id"), Some("1"));
/// # Ok(())
/// # }
/// ```
#[derive(PartialEq, Eq, Clone, Default)]
pub struct Params {
    params: Vec<Param>,
}

impl Params {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if there are no parameters in the list.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the value of the first parameter registered under the given key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();

        self.params
            .iter()
            .find(|param| param.key == key)
            .map(|param| param.value.as_str())
    }

    /// Returns the value registered under `key`, or `default` when it is
    /// missing or empty.
    pub fn get_or<'a>(&'a self, key: impl AsRef<str>, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => default,
        }
    }

    /// Returns an iterator over the parameters in the list.
    pub fn iter(&self) -> ParamsIter<'_> {
        ParamsIter {
            inner: self.params.iter(),
        }
    }

    // Inserts a key value parameter pair into the list.
    pub(crate) fn push(&mut self, key: &str, value: impl Into<String>) {
        self.params.push(Param {
            key: key.to_owned(),
            value: value.into(),
        });
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'ps> IntoIterator for &'ps Params {
    type Item = (&'ps str, &'ps str);
    type IntoIter = ParamsIter<'ps>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the keys and values of a route's [parameters](crate::Params).
pub struct ParamsIter<'ps> {
    inner: slice::Iter<'ps, Param>,
}

impl<'ps> Iterator for ParamsIter<'ps> {
    type Item = (&'ps str, &'ps str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|p| (p.key.as_str(), p.value.as_str()))
    }
}

impl ExactSizeIterator for ParamsIter<'_> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}
