//! Request parameters.
//!
//! Parameter values are a closed set of variants. Text and numeric values
//! take part in the OAuth signature; file and stream uploads never do.
//! Uploads borrow the caller's handle: the client only reads from it while
//! building the request body.

use serde_json::Number;
use std::fmt;
use std::fs::File;
use std::io::Read;

/// A single parameter value.
pub enum ParamValue<'a> {
    Text(String),
    Numeric(Number),
    File(FileUpload<'a>),
    Stream(StreamUpload<'a>),
}

impl ParamValue<'_> {
    /// True for file and stream uploads.
    pub fn is_upload(&self) -> bool {
        matches!(self, ParamValue::File(_) | ParamValue::Stream(_))
    }

    /// The wire form of a text or numeric value; `None` for uploads.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::Numeric(n) => Some(n.to_string()),
            ParamValue::File(_) | ParamValue::Stream(_) => None,
        }
    }
}

impl fmt::Debug for ParamValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            ParamValue::Numeric(n) => f.debug_tuple("Numeric").field(n).finish(),
            ParamValue::File(upload) => f.debug_tuple("File").field(&upload.file_name).finish(),
            ParamValue::Stream(upload) => f.debug_tuple("Stream").field(&upload.file_name).finish(),
        }
    }
}

impl From<String> for ParamValue<'_> {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue<'_> {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<bool> for ParamValue<'_> {
    fn from(value: bool) -> Self {
        ParamValue::Text(value.to_string())
    }
}

macro_rules! numeric_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ParamValue<'_> {
            fn from(value: $ty) -> Self {
                ParamValue::Numeric(Number::from(value))
            }
        })*
    };
}

numeric_from!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for ParamValue<'_> {
    fn from(value: f64) -> Self {
        // NaN and infinities have no JSON number form
        match Number::from_f64(value) {
            Some(n) => ParamValue::Numeric(n),
            None => ParamValue::Text(value.to_string()),
        }
    }
}

impl<'a> From<FileUpload<'a>> for ParamValue<'a> {
    fn from(value: FileUpload<'a>) -> Self {
        ParamValue::File(value)
    }
}

impl<'a> From<StreamUpload<'a>> for ParamValue<'a> {
    fn from(value: StreamUpload<'a>) -> Self {
        ParamValue::Stream(value)
    }
}

/// A raw file handle attached as an upload.
pub struct FileUpload<'a> {
    pub(crate) file: &'a File,
    pub(crate) file_name: Option<String>,
    pub(crate) content_type: Option<String>,
}

impl<'a> FileUpload<'a> {
    /// Attach a file, read from its current position.
    pub fn new(file: &'a File) -> Self {
        Self {
            file,
            file_name: None,
            content_type: None,
        }
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub(crate) fn read_all(&self) -> std::io::Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut reader = self.file;
        reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// A stream wrapper (any reader) attached as an upload.
pub struct StreamUpload<'a> {
    pub(crate) io: &'a mut (dyn Read + Send),
    pub(crate) file_name: Option<String>,
    pub(crate) content_type: Option<String>,
}

impl<'a> StreamUpload<'a> {
    /// Attach a reader, drained when the body is built.
    pub fn new(io: &'a mut (dyn Read + Send)) -> Self {
        Self {
            io,
            file_name: None,
            content_type: None,
        }
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub(crate) fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.io.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// An ordered parameter mapping. Inserting an existing key replaces its
/// value in place.
#[derive(Debug, Default)]
pub struct Params<'a> {
    entries: Vec<(String, ParamValue<'a>)>,
}

impl<'a> Params<'a> {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue<'a>>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue<'a>>) -> Self {
        self.insert(key, value);
        self
    }

    /// Attach a file handle.
    pub fn file(self, key: impl Into<String>, file: &'a File) -> Self {
        self.with(key, FileUpload::new(file))
    }

    /// Attach a stream.
    pub fn stream(self, key: impl Into<String>, io: &'a mut (dyn Read + Send)) -> Self {
        self.with(key, StreamUpload::new(io))
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&ParamValue<'a>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue<'a>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True if any value is a file or stream upload.
    pub fn has_upload(&self) -> bool {
        self.entries.iter().any(|(_, v)| v.is_upload())
    }

    /// Text and numeric values as string pairs, in insertion order.
    pub fn text_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_text().map(|text| (k.clone(), text)))
            .collect()
    }

    pub(crate) fn into_entries(self) -> Vec<(String, ParamValue<'a>)> {
        self.entries
    }
}

impl<'a, K, V> FromIterator<(K, V)> for Params<'a>
where
    K: Into<String>,
    V: Into<ParamValue<'a>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
