use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{self, Read, Write};

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Tag>),
    Compound(HashMap<String, Tag>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// Byte order of the binary encoding. Java edition files are big-endian,
/// Bedrock edition files (including `.mcstructure`) are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Big,
    #[default]
    Little,
}

// Upper bound for speculative allocations driven by length prefixes
const MAX_PREALLOC: usize = 4096;

/// Deepest nesting of lists and compounds accepted by the reader.
pub const MAX_DEPTH: usize = 512;

fn read_length<O: ByteOrder, R: Read>(reader: &mut R) -> io::Result<usize> {
    let length = reader.read_i32::<O>()?;
    usize::try_from(length).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Negative length prefix: {}", length),
        )
    })
}

fn write_length<O: ByteOrder, W: Write>(writer: &mut W, length: usize) -> io::Result<()> {
    let length = i32::try_from(length).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Length {} does not fit in a length prefix", length),
        )
    })?;
    writer.write_i32::<O>(length)
}

fn write_string<O: ByteOrder, W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    let length = u16::try_from(value.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("String of {} bytes is too long", value.len()),
        )
    })?;
    writer.write_u16::<O>(length)?;
    writer.write_all(value.as_bytes())
}

fn read_string<O: ByteOrder, R: Read>(reader: &mut R) -> io::Result<String> {
    let length = reader.read_u16::<O>()?;
    let mut bytes = vec![0u8; length as usize];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

impl Tag {
    pub fn get_type_id(&self) -> u8 {
        match self {
            Tag::End => 0,
            Tag::Byte(_) => 1,
            Tag::Short(_) => 2,
            Tag::Int(_) => 3,
            Tag::Long(_) => 4,
            Tag::Float(_) => 5,
            Tag::Double(_) => 6,
            Tag::ByteArray(_) => 7,
            Tag::String(_) => 8,
            Tag::List(_) => 9,
            Tag::Compound(_) => 10,
            Tag::IntArray(_) => 11,
            Tag::LongArray(_) => 12,
        }
    }

    pub fn empty_compound() -> Tag {
        Tag::Compound(HashMap::new())
    }

    /// Reads one named tag using the byte order `O`.
    pub fn read<O: ByteOrder, R: Read>(reader: &mut R) -> io::Result<(String, Tag)> {
        Tag::read_named::<O, R>(reader, 0)
    }

    fn read_named<O: ByteOrder, R: Read>(
        reader: &mut R,
        depth: usize,
    ) -> io::Result<(String, Tag)> {
        let type_id = reader.read_u8()?;
        if type_id == 0 {
            return Ok((String::new(), Tag::End));
        }

        let name = read_string::<O, R>(reader)?;
        let tag = Tag::read_payload::<O, R>(reader, type_id, depth)?;
        Ok((name, tag))
    }

    fn read_payload<O: ByteOrder, R: Read>(
        reader: &mut R,
        type_id: u8,
        depth: usize,
    ) -> io::Result<Tag> {
        if depth > MAX_DEPTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Tags nested deeper than {}", MAX_DEPTH),
            ));
        }

        match type_id {
            0 => Ok(Tag::End),
            1 => Ok(Tag::Byte(reader.read_i8()?)),
            2 => Ok(Tag::Short(reader.read_i16::<O>()?)),
            3 => Ok(Tag::Int(reader.read_i32::<O>()?)),
            4 => Ok(Tag::Long(reader.read_i64::<O>()?)),
            5 => Ok(Tag::Float(reader.read_f32::<O>()?)),
            6 => Ok(Tag::Double(reader.read_f64::<O>()?)),
            7 => {
                let length = read_length::<O, R>(reader)?;
                let mut bytes = Vec::with_capacity(length.min(MAX_PREALLOC));
                for _ in 0..length {
                    bytes.push(reader.read_i8()?);
                }
                Ok(Tag::ByteArray(bytes))
            }
            8 => read_string::<O, R>(reader).map(Tag::String),
            9 => {
                let list_type = reader.read_u8()?;
                let length = read_length::<O, R>(reader)?;
                let mut list = Vec::with_capacity(length.min(MAX_PREALLOC));
                for _ in 0..length {
                    list.push(Tag::read_payload::<O, R>(reader, list_type, depth + 1)?);
                }
                Ok(Tag::List(list))
            }
            10 => {
                let mut compound = HashMap::new();
                loop {
                    let (name, tag) = Tag::read_named::<O, R>(reader, depth + 1)?;
                    if let Tag::End = tag {
                        break;
                    }
                    compound.insert(name, tag);
                }
                Ok(Tag::Compound(compound))
            }
            11 => {
                let length = read_length::<O, R>(reader)?;
                let mut ints = Vec::with_capacity(length.min(MAX_PREALLOC));
                for _ in 0..length {
                    ints.push(reader.read_i32::<O>()?);
                }
                Ok(Tag::IntArray(ints))
            }
            12 => {
                let length = read_length::<O, R>(reader)?;
                let mut longs = Vec::with_capacity(length.min(MAX_PREALLOC));
                for _ in 0..length {
                    longs.push(reader.read_i64::<O>()?);
                }
                Ok(Tag::LongArray(longs))
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid tag type: {}", type_id),
            )),
        }
    }

    /// Writes this tag with `name` using the byte order `O`.
    pub fn write<O: ByteOrder, W: Write>(&self, writer: &mut W, name: &str) -> io::Result<()> {
        writer.write_u8(self.get_type_id())?;

        if !matches!(self, Tag::End) {
            write_string::<O, W>(writer, name)?;
        }

        self.write_payload::<O, W>(writer)
    }

    fn write_payload<O: ByteOrder, W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Tag::End => Ok(()),
            Tag::Byte(v) => writer.write_i8(*v),
            Tag::Short(v) => writer.write_i16::<O>(*v),
            Tag::Int(v) => writer.write_i32::<O>(*v),
            Tag::Long(v) => writer.write_i64::<O>(*v),
            Tag::Float(v) => writer.write_f32::<O>(*v),
            Tag::Double(v) => writer.write_f64::<O>(*v),
            Tag::ByteArray(v) => {
                write_length::<O, W>(writer, v.len())?;
                for &b in v {
                    writer.write_i8(b)?;
                }
                Ok(())
            }
            Tag::String(v) => write_string::<O, W>(writer, v),
            Tag::List(v) => {
                let element_type = v.first().map_or(0, Tag::get_type_id);
                if v.iter().any(|tag| tag.get_type_id() != element_type) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "List elements must share one tag type",
                    ));
                }
                writer.write_u8(element_type)?;
                write_length::<O, W>(writer, v.len())?;
                for tag in v {
                    tag.write_payload::<O, W>(writer)?;
                }
                Ok(())
            }
            Tag::Compound(v) => {
                for (name, tag) in v {
                    tag.write::<O, W>(writer, name)?;
                }
                Tag::End.write::<O, W>(writer, "")
            }
            Tag::IntArray(v) => {
                write_length::<O, W>(writer, v.len())?;
                for &i in v {
                    writer.write_i32::<O>(i)?;
                }
                Ok(())
            }
            Tag::LongArray(v) => {
                write_length::<O, W>(writer, v.len())?;
                for &l in v {
                    writer.write_i64::<O>(l)?;
                }
                Ok(())
            }
        }
    }

    /// Deep structural comparison: same variant, then same payload,
    /// recursing through lists (order-sensitive) and compounds (key-set
    /// based). Floats compare by bit pattern, so NaN payloads equal
    /// themselves and the relation stays reflexive. Mismatched shapes are
    /// simply unequal.
    pub fn structurally_eq(&self, other: &Tag) -> bool {
        match (self, other) {
            (Tag::End, Tag::End) => true,
            (Tag::Byte(a), Tag::Byte(b)) => a == b,
            (Tag::Short(a), Tag::Short(b)) => a == b,
            (Tag::Int(a), Tag::Int(b)) => a == b,
            (Tag::Long(a), Tag::Long(b)) => a == b,
            (Tag::Float(a), Tag::Float(b)) => a.to_bits() == b.to_bits(),
            (Tag::Double(a), Tag::Double(b)) => a.to_bits() == b.to_bits(),
            (Tag::ByteArray(a), Tag::ByteArray(b)) => a == b,
            (Tag::String(a), Tag::String(b)) => a == b,
            (Tag::List(a), Tag::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structurally_eq(y))
            }
            (Tag::Compound(a), Tag::Compound(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, x)| b.get(key).is_some_and(|y| x.structurally_eq(y)))
            }
            (Tag::IntArray(a), Tag::IntArray(b)) => a == b,
            (Tag::LongArray(a), Tag::LongArray(b)) => a == b,
            _ => false,
        }
    }

    pub fn as_compound(&self) -> Option<&HashMap<String, Tag>> {
        match self {
            Tag::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut HashMap<String, Tag>> {
        match self {
            Tag::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Tag>> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&String> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tag::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Tag::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Tag::Short(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Tag::Byte(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Tag::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Tag::Float(n) => Some(*n),
            _ => None,
        }
    }
}

// NBTFile is a named root tag, readable and writable in either byte order with optional gzip
pub struct NBTFile {
    pub root: Tag,
    pub name: String,
}

impl NBTFile {
    pub fn new(name: String, root: Tag) -> Self {
        NBTFile { root, name }
    }

    pub fn read<R: Read>(reader: &mut R, endianness: Endianness) -> io::Result<Self> {
        let (name, root) = match endianness {
            Endianness::Big => Tag::read::<BigEndian, R>(reader)?,
            Endianness::Little => Tag::read::<LittleEndian, R>(reader)?,
        };
        Ok(NBTFile { root, name })
    }

    pub fn write<W: Write>(&self, writer: &mut W, endianness: Endianness) -> io::Result<()> {
        match endianness {
            Endianness::Big => self.root.write::<BigEndian, W>(writer, &self.name),
            Endianness::Little => self.root.write::<LittleEndian, W>(writer, &self.name),
        }
    }

    pub fn read_gzip<R: Read>(reader: &mut R, endianness: Endianness) -> io::Result<Self> {
        let mut decoder = GzDecoder::new(reader);
        Self::read(&mut decoder, endianness)
    }

    pub fn write_gzip<W: Write>(&self, writer: &mut W, endianness: Endianness) -> io::Result<()> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        self.write(&mut encoder, endianness)?;
        encoder.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Cursor;

    fn block(name: &str) -> Tag {
        let mut states = HashMap::new();
        states.insert("facing".to_string(), Tag::String("north".to_string()));
        let mut map = HashMap::new();
        map.insert("name".to_string(), Tag::String(name.to_string()));
        map.insert("states".to_string(), Tag::Compound(states));
        map.insert("version".to_string(), Tag::Int(17959425));
        Tag::Compound(map)
    }

    #[test]
    fn test_tag_type_ids() {
        assert_eq!(Tag::End.get_type_id(), 0);
        assert_eq!(Tag::Byte(0).get_type_id(), 1);
        assert_eq!(Tag::Short(0).get_type_id(), 2);
        assert_eq!(Tag::Int(0).get_type_id(), 3);
        assert_eq!(Tag::Long(0).get_type_id(), 4);
        assert_eq!(Tag::Float(0.0).get_type_id(), 5);
        assert_eq!(Tag::Double(0.0).get_type_id(), 6);
        assert_eq!(Tag::ByteArray(vec![]).get_type_id(), 7);
        assert_eq!(Tag::String("".to_string()).get_type_id(), 8);
        assert_eq!(Tag::List(vec![]).get_type_id(), 9);
        assert_eq!(Tag::empty_compound().get_type_id(), 10);
        assert_eq!(Tag::IntArray(vec![]).get_type_id(), 11);
        assert_eq!(Tag::LongArray(vec![]).get_type_id(), 12);
    }

    #[test]
    fn test_tag_as_methods() {
        let mut map = HashMap::new();
        map.insert("test".to_string(), Tag::Int(42));
        let mut compound = Tag::Compound(map);
        assert_eq!(
            compound.as_compound().and_then(|m| m.get("test")),
            Some(&Tag::Int(42))
        );
        compound
            .as_compound_mut()
            .unwrap()
            .insert("other".to_string(), Tag::Long(7));
        assert_eq!(compound.as_compound().unwrap().len(), 2);
        assert!(Tag::Int(0).as_compound().is_none());

        let list = Tag::List(vec![Tag::Int(1), Tag::Int(2)]);
        assert_eq!(list.as_list().unwrap().len(), 2);
        assert!(Tag::Int(0).as_list().is_none());

        assert_eq!(Tag::String("test".to_string()).as_string().unwrap(), "test");
        assert!(Tag::Int(0).as_string().is_none());

        assert_eq!(Tag::Byte(42).as_i8(), Some(42));
        assert_eq!(Tag::Short(42).as_i16(), Some(42));
        assert_eq!(Tag::Int(42).as_i32(), Some(42));
        assert_eq!(Tag::Long(42).as_i64(), Some(42));
        assert_eq!(Tag::Float(42.0).as_f32(), Some(42.0));
        assert_eq!(Tag::Double(42.0).as_f64(), Some(42.0));
        assert_eq!(Tag::Int(42).as_i64(), None);
    }

    #[test]
    fn test_tag_read_write_both_orders() {
        let test_cases = vec![
            (Tag::Byte(42), "byte"),
            (Tag::Short(1234), "short"),
            (Tag::Int(12345678), "int"),
            (Tag::Long(123456789012), "long"),
            (Tag::Float(3.25), "float"),
            (Tag::Double(3.14159), "double"),
            (Tag::ByteArray(vec![1, 2, 3]), "bytearray"),
            (Tag::String("Hello, World!".to_string()), "string"),
            (
                Tag::List(vec![Tag::Int(1), Tag::Int(2), Tag::Int(3)]),
                "list",
            ),
            (Tag::IntArray(vec![1, 2, 3]), "intarray"),
            (Tag::LongArray(vec![1, 2, 3]), "longarray"),
        ];

        for (tag, name) in test_cases {
            let mut big = Vec::new();
            tag.write::<BigEndian, _>(&mut big, name).unwrap();
            let (read_name, read_tag) = Tag::read::<BigEndian, _>(&mut Cursor::new(big)).unwrap();
            assert_eq!(read_name, name);
            assert_eq!(read_tag, tag);

            let mut little = Vec::new();
            tag.write::<LittleEndian, _>(&mut little, name).unwrap();
            let (read_name, read_tag) =
                Tag::read::<LittleEndian, _>(&mut Cursor::new(little)).unwrap();
            assert_eq!(read_name, name);
            assert_eq!(read_tag, tag);
        }
    }

    #[test]
    fn test_little_endian_layout() {
        let mut buffer = Vec::new();
        Tag::Int(1).write::<LittleEndian, _>(&mut buffer, "a").unwrap();
        assert_eq!(buffer, vec![3, 1, 0, b'a', 1, 0, 0, 0]);

        let mut buffer = Vec::new();
        Tag::Int(1).write::<BigEndian, _>(&mut buffer, "a").unwrap();
        assert_eq!(buffer, vec![3, 0, 1, b'a', 0, 0, 0, 1]);
    }

    #[test]
    fn test_compound_tag_read_write() {
        let mut compound = HashMap::new();
        compound.insert("byte".to_string(), Tag::Byte(42));
        compound.insert("string".to_string(), Tag::String("test".to_string()));
        compound.insert(
            "list".to_string(),
            Tag::List(vec![Tag::Int(1), Tag::Int(2)]),
        );
        compound.insert("nested".to_string(), block("minecraft:chest"));

        let tag = Tag::Compound(compound);

        let mut buffer = Vec::new();
        tag.write::<LittleEndian, _>(&mut buffer, "root").unwrap();

        let (name, read_tag) = Tag::read::<LittleEndian, _>(&mut Cursor::new(buffer)).unwrap();

        assert_eq!(name, "root");
        assert_eq!(read_tag, tag);
    }

    #[test]
    fn test_nbt_file() {
        let mut compound = HashMap::new();
        compound.insert("name".to_string(), Tag::String("Test".to_string()));
        compound.insert("value".to_string(), Tag::Int(42));

        let original = NBTFile::new("test".to_string(), Tag::Compound(compound));

        for endianness in [Endianness::Big, Endianness::Little] {
            let mut buffer = Vec::new();
            original.write(&mut buffer, endianness).unwrap();
            let read = NBTFile::read(&mut Cursor::new(buffer), endianness).unwrap();
            assert_eq!(read.name, original.name);
            assert_eq!(read.root, original.root);

            let mut gzip_buffer = Vec::new();
            original.write_gzip(&mut gzip_buffer, endianness).unwrap();
            let gzip_read = NBTFile::read_gzip(&mut Cursor::new(gzip_buffer), endianness).unwrap();
            assert_eq!(gzip_read.name, original.name);
            assert_eq!(gzip_read.root, original.root);
        }
    }

    #[test]
    fn test_invalid_tag_type() {
        let result = Tag::read_payload::<BigEndian, _>(&mut Cursor::new(vec![255u8]), 255, 0);
        assert_matches!(result, Err(e) if e.kind() == io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_negative_length_rejected() {
        // IntArray with a length prefix of -1
        let buffer = vec![0xff, 0xff, 0xff, 0xff];
        let result = Tag::read_payload::<LittleEndian, _>(&mut Cursor::new(buffer), 11, 0);
        assert_matches!(result, Err(e) if e.kind() == io::ErrorKind::InvalidData);
    }

    fn nested_lists(levels: usize) -> Vec<u8> {
        let mut buffer = vec![9, 0, 0];
        for _ in 0..levels {
            buffer.extend_from_slice(&[9, 1, 0, 0, 0]);
        }
        buffer.extend_from_slice(&[0, 0, 0, 0, 0]);
        buffer
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let result = Tag::read::<LittleEndian, _>(&mut Cursor::new(nested_lists(200_000)));
        assert_matches!(result, Err(e) if e.kind() == io::ErrorKind::InvalidData);

        let result = Tag::read::<LittleEndian, _>(&mut Cursor::new(nested_lists(MAX_DEPTH + 1)));
        assert_matches!(result, Err(e) if e.kind() == io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_nesting_up_to_limit() {
        let (_, mut tag) =
            Tag::read::<LittleEndian, _>(&mut Cursor::new(nested_lists(MAX_DEPTH))).unwrap();
        let mut levels = 0;
        while let Tag::List(mut inner) = tag {
            match inner.pop() {
                Some(next) => {
                    levels += 1;
                    tag = next;
                }
                None => break,
            }
        }
        assert_eq!(levels, MAX_DEPTH);
    }

    #[test]
    fn test_heterogeneous_list_rejected() {
        let tag = Tag::List(vec![Tag::Int(1), Tag::Long(2)]);
        let result = tag.write::<LittleEndian, _>(&mut Vec::new(), "mixed");
        assert_matches!(result, Err(e) if e.kind() == io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_empty_list() {
        let tag = Tag::List(vec![]);
        let mut buffer = Vec::new();
        tag.write::<BigEndian, _>(&mut buffer, "empty").unwrap();

        let (name, read_tag) = Tag::read::<BigEndian, _>(&mut Cursor::new(buffer)).unwrap();

        assert_eq!(name, "empty");
        assert_eq!(read_tag, tag);
    }

    #[test]
    fn test_structurally_eq() {
        assert!(block("minecraft:stone").structurally_eq(&block("minecraft:stone")));
        assert!(!block("minecraft:stone").structurally_eq(&block("minecraft:dirt")));
        assert!(Tag::empty_compound().structurally_eq(&Tag::empty_compound()));

        // same value, different scalar width
        assert!(!Tag::Int(1).structurally_eq(&Tag::Long(1)));
        assert!(!Tag::Int(1).structurally_eq(&Tag::empty_compound()));

        let a = Tag::List(vec![Tag::Int(1), Tag::Int(2)]);
        let b = Tag::List(vec![Tag::Int(2), Tag::Int(1)]);
        assert!(!a.structurally_eq(&b));

        let nan = Tag::Float(f32::NAN);
        assert!(nan.structurally_eq(&nan.clone()));

        let mut extra = block("minecraft:stone");
        extra
            .as_compound_mut()
            .unwrap()
            .insert("extra".to_string(), Tag::Byte(0));
        assert!(!extra.structurally_eq(&block("minecraft:stone")));
        assert!(!block("minecraft:stone").structurally_eq(&extra));
    }
}
