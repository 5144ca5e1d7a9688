//! PDF Object Model
//!
//! This module defines the core PDF object types as specified in the PDF Reference.
//! PDF uses a small set of basic object types that can be combined to represent
//! all document data. Objects here are always direct values; identity (object
//! number, generation, byte offset) is only acquired when an object is promoted
//! through the [`ObjectRegistry`](crate::ObjectRegistry).

use std::borrow::{Borrow, Cow};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

/// Reference to an indirect object (`id generation R`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Object number, never 0 for a live object
    pub id: u32,
    /// Generation number
    pub generation: u16,
}

impl ObjectRef {
    pub fn new(id: u32, generation: u16) -> Self {
        Self { id, generation }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.id, self.generation)
    }
}

/// PDF name (written with a leading `/`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PdfName(String);

impl PdfName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PdfName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PdfName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PdfName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PdfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// PDF object types
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer number
    Integer(i64),
    /// Real (floating-point) number
    Real(f64),
    /// String (literal or hexadecimal)
    String(PdfString),
    /// Name object (starts with /)
    Name(PdfName),
    /// Array of objects
    Array(Vec<PdfObject>),
    /// Dictionary (key-value pairs)
    Dictionary(PdfDictionary),
    /// Stream (dictionary + byte data)
    Stream(PdfStream),
    /// Indirect reference
    Reference(ObjectRef),
}

/// PDF string encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfString {
    /// Literal string enclosed in parentheses
    Literal(Vec<u8>),
    /// Hexadecimal string enclosed in angle brackets
    Hex(Vec<u8>),
}

impl PdfString {
    /// Create a literal string from bytes
    pub fn literal(data: impl Into<Vec<u8>>) -> Self {
        PdfString::Literal(data.into())
    }

    /// Create a hex string from bytes
    pub fn hex(data: impl Into<Vec<u8>>) -> Self {
        PdfString::Hex(data.into())
    }

    /// Text string: PDFDocEncoding-compatible text stays literal, anything
    /// else is written as UTF-16BE with a byte order mark
    pub fn text(s: &str) -> Self {
        if s.chars().all(|c| (c as u32) < 0x80) {
            PdfString::Literal(s.as_bytes().to_vec())
        } else {
            let mut bytes = vec![0xFE, 0xFF];
            for unit in s.encode_utf16() {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
            PdfString::Hex(bytes)
        }
    }

    pub fn is_hex(&self) -> bool {
        matches!(self, PdfString::Hex(_))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PdfString::Literal(data) | PdfString::Hex(data) => data,
        }
    }
}

/// PDF dictionary.
///
/// Keys are unique names; entry order carries no meaning, so entries are
/// kept sorted to make serialization deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfDictionary {
    entries: BTreeMap<PdfName, PdfObject>,
}

impl PdfDictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<PdfName>, value: impl Into<PdfObject>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Get a value by key, given as a name or plain text
    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        self.entries.get(key)
    }

    /// Get a mutable value by key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut PdfObject> {
        self.entries.get_mut(key)
    }

    /// Remove a value by key
    pub fn remove(&mut self, key: &str) -> Option<PdfObject> {
        self.entries.remove(key)
    }

    /// Check if dictionary contains a key
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Get number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = (&PdfName, &PdfObject)> {
        self.entries.iter()
    }

    /// Set the Type entry (common for PDF objects)
    pub fn with_type(mut self, type_name: &str) -> Self {
        self.insert("Type", PdfObject::name(type_name));
        self
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<PdfObject>) -> Self {
        self.insert(key, value);
        self
    }

    /// The value of a name entry, if present and a name
    pub fn get_name(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(PdfObject::Name(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// The value of a reference entry, if present and a reference
    pub fn get_reference(&self, key: &str) -> Option<ObjectRef> {
        match self.get(key) {
            Some(PdfObject::Reference(r)) => Some(*r),
            _ => None,
        }
    }

    /// Get a nested dictionary, creating it when missing.
    /// Returns None if the key holds some other type.
    pub fn dictionary_entry(&mut self, key: &str) -> Option<&mut PdfDictionary> {
        let entry = self
            .entries
            .entry(PdfName::from(key))
            .or_insert_with(|| PdfObject::Dictionary(PdfDictionary::new()));
        match entry {
            PdfObject::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Get an array entry, creating it when missing.
    /// Returns None if the key holds some other type.
    pub fn array_entry(&mut self, key: &str) -> Option<&mut Vec<PdfObject>> {
        let entry = self
            .entries
            .entry(PdfName::from(key))
            .or_insert_with(|| PdfObject::Array(Vec::new()));
        match entry {
            PdfObject::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// PDF stream (dictionary + data)
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStream {
    /// Stream dictionary, always written in direct form
    pub dict: PdfDictionary,
    /// Stream payload; encoded already if `dict` carries a Filter
    pub data: Vec<u8>,
}

impl PdfStream {
    /// Create a new stream with data
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            dict: PdfDictionary::new(),
            data,
        }
    }

    /// Create a stream with a dictionary
    pub fn with_dict(mut self, dict: PdfDictionary) -> Self {
        for (key, value) in dict.entries {
            self.dict.insert(key, value);
        }
        self
    }

    /// Whether the payload is already encoded
    pub fn has_filter(&self) -> bool {
        self.dict.contains_key("Filter")
    }

    /// Get the raw payload length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if stream is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dictionary and payload as they will be written.
    ///
    /// Without an explicit Filter the payload is deflated and Filter set to
    /// FlateDecode (unless compression is disabled); Length always reflects
    /// the final byte count.
    pub fn encoded(&self, compress: bool) -> io::Result<(PdfDictionary, Cow<'_, [u8]>)> {
        let mut dict = self.dict.clone();
        let data: Cow<'_, [u8]> = if compress && !self.has_filter() {
            use flate2::write::ZlibEncoder;
            use flate2::Compression;

            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&self.data)?;
            dict.insert("Filter", PdfObject::name("FlateDecode"));
            Cow::Owned(encoder.finish()?)
        } else {
            Cow::Borrowed(&self.data)
        };
        dict.insert("Length", PdfObject::Integer(data.len() as i64));
        Ok((dict, data))
    }
}

/// Serializer for PDF objects
pub struct PdfSerializer<W: Write> {
    writer: W,
    compress: bool,
}

impl<W: Write> PdfSerializer<W> {
    /// Create a new serializer (stream compression on)
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            compress: true,
        }
    }

    /// Set whether streams without a Filter get deflated
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Write a PDF object in direct form
    pub fn write_object(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Null => write!(self.writer, "null"),
            PdfObject::Boolean(b) => {
                write!(self.writer, "{}", if *b { "true" } else { "false" })
            }
            PdfObject::Integer(n) => write!(self.writer, "{}", n),
            PdfObject::Real(n) => write!(self.writer, "{}", format_real(*n)),
            PdfObject::String(s) => self.write_string(s),
            PdfObject::Name(name) => self.write_name(name.as_str()),
            PdfObject::Array(arr) => self.write_array(arr),
            PdfObject::Dictionary(dict) => self.write_dictionary(dict),
            PdfObject::Stream(stream) => self.write_stream(stream),
            PdfObject::Reference(r) => write!(self.writer, "{}", r),
        }
    }

    /// Write an object in indirect form: `id gen obj ... endobj`
    pub fn write_indirect(&mut self, reference: ObjectRef, obj: &PdfObject) -> io::Result<()> {
        write!(self.writer, "{} {} obj\n", reference.id, reference.generation)?;
        self.write_object(obj)?;
        write!(self.writer, "\nendobj\n")
    }

    /// Write a PDF string
    fn write_string(&mut self, s: &PdfString) -> io::Result<()> {
        match s {
            PdfString::Literal(data) => {
                write!(self.writer, "(")?;
                for &byte in data {
                    match byte {
                        b'(' | b')' | b'\\' => {
                            write!(self.writer, "\\{}", byte as char)?;
                        }
                        0x0A => write!(self.writer, "\\n")?,
                        0x0D => write!(self.writer, "\\r")?,
                        0x09 => write!(self.writer, "\\t")?,
                        0x08 => write!(self.writer, "\\b")?,
                        0x0C => write!(self.writer, "\\f")?,
                        0x20..=0x7E => write!(self.writer, "{}", byte as char)?,
                        _ => write!(self.writer, "\\{:03o}", byte)?,
                    }
                }
                write!(self.writer, ")")
            }
            PdfString::Hex(data) => {
                write!(self.writer, "<")?;
                for byte in data {
                    write!(self.writer, "{:02X}", byte)?;
                }
                write!(self.writer, ">")
            }
        }
    }

    /// Write a PDF name
    fn write_name(&mut self, name: &str) -> io::Result<()> {
        write!(self.writer, "/")?;
        for byte in name.bytes() {
            match byte {
                0x21..=0x7E
                    if !matches!(
                        byte,
                        b'#' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
                    ) =>
                {
                    write!(self.writer, "{}", byte as char)?;
                }
                _ => write!(self.writer, "#{:02X}", byte)?,
            }
        }
        Ok(())
    }

    /// Write a PDF array
    fn write_array(&mut self, arr: &[PdfObject]) -> io::Result<()> {
        write!(self.writer, "[")?;
        for (i, obj) in arr.iter().enumerate() {
            if i > 0 {
                write!(self.writer, " ")?;
            }
            self.write_object(obj)?;
        }
        write!(self.writer, "]")
    }

    /// Write a PDF dictionary
    fn write_dictionary(&mut self, dict: &PdfDictionary) -> io::Result<()> {
        write!(self.writer, "<<")?;
        for (key, value) in dict.iter() {
            write!(self.writer, " ")?;
            self.write_name(key.as_str())?;
            write!(self.writer, " ")?;
            self.write_object(value)?;
        }
        write!(self.writer, " >>")
    }

    /// Write a PDF stream
    fn write_stream(&mut self, stream: &PdfStream) -> io::Result<()> {
        let (dict, data) = stream.encoded(self.compress)?;
        self.write_dictionary(&dict)?;
        write!(self.writer, "\nstream\n")?;
        self.writer.write_all(&data)?;
        write!(self.writer, "\nendstream")
    }

    /// Access the underlying writer
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume the serializer and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Format a real number without exponent notation
pub(crate) fn format_real(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    if n.fract() == 0.0 {
        format!("{:.1}", n)
    } else {
        let s = format!("{:.6}", n);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    }
}

// Convenience constructors for PdfObject
impl PdfObject {
    /// Create an integer object
    pub fn int(n: i64) -> Self {
        PdfObject::Integer(n)
    }

    /// Create a real number object
    pub fn real(n: f64) -> Self {
        PdfObject::Real(n)
    }

    /// Create a name object
    pub fn name(s: impl Into<String>) -> Self {
        PdfObject::Name(PdfName::new(s))
    }

    /// Create a literal string object
    pub fn string(s: impl Into<Vec<u8>>) -> Self {
        PdfObject::String(PdfString::literal(s))
    }

    /// Create a text string object
    pub fn text(s: &str) -> Self {
        PdfObject::String(PdfString::text(s))
    }

    /// Create a reference object
    pub fn reference(r: ObjectRef) -> Self {
        PdfObject::Reference(r)
    }

    /// Create an array of reals, e.g. a rectangle
    pub fn reals(values: &[f64]) -> Self {
        PdfObject::Array(values.iter().map(|v| PdfObject::Real(*v)).collect())
    }

    /// Serialize in direct form
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut serializer = PdfSerializer::new(Vec::new());
        serializer.write_object(self)?;
        Ok(serializer.into_inner())
    }

    pub fn as_dictionary(&self) -> Option<&PdfDictionary> {
        match self {
            PdfObject::Dictionary(dict) => Some(dict),
            PdfObject::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut PdfDictionary> {
        match self {
            PdfObject::Dictionary(dict) => Some(dict),
            PdfObject::Stream(stream) => Some(&mut stream.dict),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PdfObject::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Short type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            PdfObject::Null => "null",
            PdfObject::Boolean(_) => "boolean",
            PdfObject::Integer(_) => "integer",
            PdfObject::Real(_) => "real",
            PdfObject::String(_) => "string",
            PdfObject::Name(_) => "name",
            PdfObject::Array(_) => "array",
            PdfObject::Dictionary(_) => "dictionary",
            PdfObject::Stream(_) => "stream",
            PdfObject::Reference(_) => "reference",
        }
    }
}

impl From<bool> for PdfObject {
    fn from(b: bool) -> Self {
        PdfObject::Boolean(b)
    }
}

impl From<i32> for PdfObject {
    fn from(n: i32) -> Self {
        PdfObject::Integer(n as i64)
    }
}

impl From<i64> for PdfObject {
    fn from(n: i64) -> Self {
        PdfObject::Integer(n)
    }
}

impl From<u32> for PdfObject {
    fn from(n: u32) -> Self {
        PdfObject::Integer(n as i64)
    }
}

impl From<usize> for PdfObject {
    fn from(n: usize) -> Self {
        PdfObject::Integer(n as i64)
    }
}

impl From<f64> for PdfObject {
    fn from(n: f64) -> Self {
        PdfObject::Real(n)
    }
}

impl From<f32> for PdfObject {
    fn from(n: f32) -> Self {
        PdfObject::Real(n as f64)
    }
}

impl From<PdfName> for PdfObject {
    fn from(name: PdfName) -> Self {
        PdfObject::Name(name)
    }
}

impl From<PdfString> for PdfObject {
    fn from(s: PdfString) -> Self {
        PdfObject::String(s)
    }
}

impl From<ObjectRef> for PdfObject {
    fn from(r: ObjectRef) -> Self {
        PdfObject::Reference(r)
    }
}

impl From<PdfDictionary> for PdfObject {
    fn from(dict: PdfDictionary) -> Self {
        PdfObject::Dictionary(dict)
    }
}

impl From<PdfStream> for PdfObject {
    fn from(stream: PdfStream) -> Self {
        PdfObject::Stream(stream)
    }
}

impl From<Vec<PdfObject>> for PdfObject {
    fn from(arr: Vec<PdfObject>) -> Self {
        PdfObject::Array(arr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(obj: &PdfObject) -> String {
        String::from_utf8(obj.to_bytes().unwrap()).unwrap()
    }

    #[test]
    fn test_serialize_scalars() {
        assert_eq!(serialize(&PdfObject::Null), "null");
        assert_eq!(serialize(&PdfObject::Boolean(true)), "true");
        assert_eq!(serialize(&PdfObject::Integer(42)), "42");
        assert_eq!(serialize(&PdfObject::Real(3.14159)), "3.14159");
        assert_eq!(serialize(&PdfObject::Real(2.0)), "2.0");
    }

    #[test]
    fn test_numbers_never_use_exponent() {
        assert_eq!(serialize(&PdfObject::Integer(10_000_000_000)), "10000000000");
        assert_eq!(serialize(&PdfObject::Real(1e12)), "1000000000000.0");
        assert_eq!(serialize(&PdfObject::Real(1e-9)), "0");
        assert_eq!(serialize(&PdfObject::Real(-0.5)), "-0.5");
    }

    #[test]
    fn test_serialize_strings() {
        assert_eq!(serialize(&PdfObject::string("a(b)c\\")), "(a\\(b\\)c\\\\)");
        assert_eq!(
            serialize(&PdfObject::String(PdfString::hex(vec![0x0A, 0xFF]))),
            "<0AFF>"
        );
        assert!(PdfString::text("naïve").is_hex());
        assert!(!PdfString::text("plain").is_hex());
    }

    #[test]
    fn test_serialize_name_escapes() {
        assert_eq!(serialize(&PdfObject::name("Type")), "/Type");
        assert_eq!(serialize(&PdfObject::name("A B#")), "/A#20B#23");
    }

    #[test]
    fn test_serialize_array() {
        let arr = PdfObject::Array(vec![
            PdfObject::Integer(1),
            PdfObject::Integer(2),
            PdfObject::Integer(3),
        ]);
        assert_eq!(serialize(&arr), "[1 2 3]");
    }

    #[test]
    fn test_serialize_dictionary() {
        let dict = PdfDictionary::new()
            .with_type("Page")
            .with("Parent", ObjectRef::new(2, 0));
        assert_eq!(
            serialize(&PdfObject::Dictionary(dict)),
            "<< /Parent 2 0 R /Type /Page >>"
        );
    }

    #[test]
    fn test_dictionary_lookup_by_plain_key() {
        let mut dict = PdfDictionary::new();
        dict.insert(PdfName::new("Count"), 3);
        assert_eq!(dict.get("Count"), Some(&PdfObject::Integer(3)));

        dict.insert("Count", 4);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("Count").and_then(PdfObject::as_integer), Some(4));
    }

    #[test]
    fn test_serialize_indirect() {
        let mut serializer = PdfSerializer::new(Vec::new());
        serializer
            .write_indirect(ObjectRef::new(7, 0), &PdfObject::Integer(42))
            .unwrap();
        let out = String::from_utf8(serializer.into_inner()).unwrap();
        assert_eq!(out, "7 0 obj\n42\nendobj\n");
        assert_eq!(ObjectRef::new(7, 0).to_string(), "7 0 R");
    }

    #[test]
    fn test_stream_compressed_with_length() {
        let stream = PdfStream::new(b"BT /F1 12 Tf (Hello) Tj ET".repeat(20));
        let (dict, data) = stream.encoded(true).unwrap();
        assert_eq!(dict.get_name("Filter"), Some("FlateDecode"));
        assert_eq!(dict.get("Length"), Some(&PdfObject::Integer(data.len() as i64)));
        assert!(data.len() < stream.len());
    }

    #[test]
    fn test_stream_with_filter_is_not_reencoded() {
        let stream = PdfStream::new(vec![1, 2, 3])
            .with_dict(PdfDictionary::new().with("Filter", PdfObject::name("DCTDecode")));
        let (dict, data) = stream.encoded(true).unwrap();
        assert_eq!(dict.get_name("Filter"), Some("DCTDecode"));
        assert_eq!(&*data, &[1, 2, 3]);
        assert_eq!(dict.get("Length"), Some(&PdfObject::Integer(3)));
    }

    #[test]
    fn test_stream_uncompressed_serialization() {
        let mut serializer = PdfSerializer::new(Vec::new()).with_compression(false);
        serializer
            .write_object(&PdfObject::Stream(PdfStream::new(b"0 0 m".to_vec())))
            .unwrap();
        let out = String::from_utf8(serializer.into_inner()).unwrap();
        assert_eq!(out, "<< /Length 5 >>\nstream\n0 0 m\nendstream");
    }
}
