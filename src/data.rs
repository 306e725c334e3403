use std::{fmt, sync::Arc};

/// One record of the dataset, keyed by column name.
///
/// Rows produced by the loader share a single header slice, so every row
/// carries exactly the header's columns in header order.
#[derive(Clone, PartialEq, Eq)]
pub struct Row {
    headers: Arc<[String]>,
    values: Vec<String>,
}

/// The in-memory ordered sequence of rows for one invocation.
pub type Dataset = Vec<Row>;

impl Row {
    /// Builds a row over `headers`; `values` must match the header width.
    pub fn new(headers: Arc<[String]>, values: Vec<String>) -> Self {
        debug_assert_eq!(headers.len(), values.len());
        Self { headers, values }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (headers, values): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            headers: headers.into(),
            values,
        }
    }

    /// Value of `column`. When the header repeats a name, the last
    /// occurrence wins.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .rposition(|header| header == column)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }

    pub fn columns(&self) -> &[String] {
        &self.headers
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
