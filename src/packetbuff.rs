use std::fmt::Write as _;

use crate::error::PacketError;

type Result<T> = std::result::Result<T, PacketError>;

pub struct PacketBuffer {
    pub buf: [u8; 512],
    pub pos: usize,
    // end of readable data
    len: usize,
    // names written so far and their offsets, used for compression
    names: Vec<(Vec<Vec<u8>>, u16)>,
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketBuffer {
    pub const LEN: usize = 512;

    const MAX_JUMPS: usize = 5;
    const MAX_LABEL_LEN: usize = 63;
    const MAX_NAME_LEN: usize = 255;

    // fresh packet buffer
    pub fn new() -> PacketBuffer {
        PacketBuffer {
            buf: [0; 512],
            pos: 0,
            len: Self::LEN,
            names: Vec::new(),
        }
    }

    // buffer holding a received datagram, reads stop at its length
    pub fn from_slice(data: &[u8]) -> Result<PacketBuffer> {
        if data.len() > Self::LEN {
            return Err(PacketError::EndOfBuffer);
        }

        let mut buffer = PacketBuffer::new();
        buffer.buf[..data.len()].copy_from_slice(data);
        buffer.len = data.len();
        Ok(buffer)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[0..self.pos]
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    // number of bytes that can still be read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.len.saturating_sub(self.pos)
    }

    #[inline]
    fn step(&mut self, n: usize) {
        self.pos += n;
    }

    #[inline]
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Result<u8> {
        if pos >= self.len {
            return Err(PacketError::EndOfBuffer);
        }

        Ok(self.buf[pos])
    }

    #[inline]
    pub fn get_range(&self, start: usize, end: usize) -> Result<&[u8]> {
        if start > end || end > self.len {
            return Err(PacketError::EndOfBuffer);
        }

        Ok(&self.buf[start..end])
    }

    #[inline]
    pub fn read_slice<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut arr = [0; N];
        arr.copy_from_slice(self.get_range(self.pos, self.pos + N)?);
        self.step(N);

        Ok(arr)
    }

    pub fn read_vec(&mut self, n: usize) -> Result<Vec<u8>> {
        let data = self.get_range(self.pos, self.pos + n)?.to_vec();
        self.step(n);

        Ok(data)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self.get(self.pos)?;
        self.step(1);
        Ok(byte)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_slice::<2>()?))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_slice::<4>()?))
    }

    // read a domain name from the buffer
    // names are a series of labels, each prefixed with a length byte, and end
    // with a zero length byte or a pointer to an earlier name in the packet.
    // the result always carries a trailing dot, the root name is "."
    pub fn read_qname(&mut self, out: &mut String) -> Result<()> {
        let mut pos = self.pos;

        let mut jumped = false;
        let mut jumps = 0;
        let mut wire_len = 1;

        loop {
            let len = self.get(pos)?;

            match len & 0xC0 {
                0xC0 => {
                    if jumps == Self::MAX_JUMPS {
                        return Err(PacketError::TooManyJumps(Self::MAX_JUMPS));
                    }

                    let b2 = self.get(pos + 1)? as usize;
                    let target = (((len & 0x3F) as usize) << 8) | b2;

                    // pointers may only go backwards, which rules out self references
                    if target >= pos {
                        return Err(PacketError::ForwardPointer { at: pos, target });
                    }

                    if !jumped {
                        self.seek(pos + 2);
                    }

                    pos = target;
                    jumps += 1;
                    jumped = true;
                }
                0x00 => {
                    pos += 1;

                    if len == 0 {
                        break;
                    }

                    wire_len += len as usize + 1;
                    if wire_len > Self::MAX_NAME_LEN {
                        return Err(PacketError::NameTooLong(wire_len));
                    }

                    let label = self.get_range(pos, pos + len as usize)?;
                    push_label(out, label);
                    out.push('.');

                    pos += len as usize;
                }
                other => return Err(PacketError::LabelType(other)),
            }
        }

        if out.is_empty() {
            out.push('.');
        }

        if !jumped {
            self.seek(pos);
        }

        Ok(())
    }

    #[inline]
    pub fn write_u8(&mut self, val: u8) -> Result<()> {
        self.write_bytes(&[val])
    }

    #[inline]
    pub fn write_u16(&mut self, val: u16) -> Result<()> {
        self.write_bytes(&val.to_be_bytes())
    }

    #[inline]
    pub fn write_u32(&mut self, val: u32) -> Result<()> {
        self.write_bytes(&val.to_be_bytes())
    }

    #[inline]
    pub fn write_slice<const N: usize>(&mut self, slice: &[u8; N]) -> Result<()> {
        self.write_bytes(slice)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.pos + bytes.len() > Self::LEN {
            return Err(PacketError::EndOfBuffer);
        }

        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.step(bytes.len());
        Ok(())
    }

    // write a domain name, pointing back at an identical name if one
    // was already written to this buffer
    pub fn write_qname(&mut self, qname: &str) -> Result<()> {
        let labels = parse_name(qname)?;

        if labels.is_empty() {
            return self.write_u8(0);
        }

        let known = self
            .names
            .iter()
            .find(|(name, _)| *name == labels)
            .map(|(_, offset)| *offset);

        if let Some(offset) = known {
            return self.write_u16(0xC000 | offset);
        }

        let start = self.pos;
        for label in &labels {
            self.write_u8(label.len() as u8)?;
            self.write_bytes(label)?;
        }
        self.write_u8(0)?;

        if start <= 0x3FFF {
            self.names.push((labels, start as u16));
        }

        Ok(())
    }
}

// append a raw label, escaping anything that would not survive being parsed back
fn push_label(out: &mut String, label: &[u8]) {
    for &byte in label {
        match byte {
            b'.' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            }
            0x21..=0x7E => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03}", byte);
            }
        }
    }
}

// check that a name could be written to the wire
pub(crate) fn validate_name(name: &str) -> Result<()> {
    parse_name(name).map(|_| ())
}

// split a presentation format name into its raw labels
fn parse_name(name: &str) -> Result<Vec<Vec<u8>>> {
    if name.is_empty() || name == "." {
        return Ok(Vec::new());
    }

    let invalid_escape = || PacketError::InvalidEscape(name.to_string());

    let mut labels = Vec::new();
    let mut label = Vec::new();
    let mut bytes = name.bytes();

    while let Some(byte) = bytes.next() {
        match byte {
            b'.' => {
                if label.is_empty() {
                    return Err(PacketError::EmptyLabel(name.to_string()));
                }
                labels.push(std::mem::take(&mut label));
            }
            b'\\' => {
                let first = bytes.next().ok_or_else(invalid_escape)?;
                if first.is_ascii_digit() {
                    let mut value = (first - b'0') as u16;
                    for _ in 0..2 {
                        let digit = bytes
                            .next()
                            .filter(u8::is_ascii_digit)
                            .ok_or_else(invalid_escape)?;
                        value = value * 10 + (digit - b'0') as u16;
                    }
                    let value = u8::try_from(value).map_err(|_| invalid_escape())?;
                    label.push(value);
                } else {
                    label.push(first);
                }
            }
            _ => label.push(byte),
        }

        if label.len() > PacketBuffer::MAX_LABEL_LEN {
            return Err(PacketError::LabelTooLong(label.len()));
        }
    }

    if !label.is_empty() {
        labels.push(label);
    }

    let wire_len = labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1;
    if wire_len > PacketBuffer::MAX_NAME_LEN {
        return Err(PacketError::NameTooLong(wire_len));
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_name(bytes: &[u8], start: usize) -> Result<(String, usize)> {
        let mut buffer = PacketBuffer::from_slice(bytes)?;
        buffer.seek(start);
        let mut name = String::new();
        buffer.read_qname(&mut name)?;
        Ok((name, buffer.pos()))
    }

    #[test]
    fn reads_plain_name_with_trailing_dot() {
        let bytes = b"\x07example\x03lab\x00";
        let (name, pos) = read_name(bytes, 0).unwrap();
        assert_eq!(name, "example.lab.");
        assert_eq!(pos, bytes.len());
    }

    #[test]
    fn preserves_case() {
        let (name, _) = read_name(b"\x07ExAmPlE\x03LAB\x00", 0).unwrap();
        assert_eq!(name, "ExAmPlE.LAB.");
    }

    #[test]
    fn reads_root_name() {
        let (name, pos) = read_name(b"\x00", 0).unwrap();
        assert_eq!(name, ".");
        assert_eq!(pos, 1);
    }

    #[test]
    fn follows_compression_pointer() {
        // "lab." at 0, then "example" + pointer to 0
        let bytes = b"\x03lab\x00\x07example\xC0\x00";
        let (name, pos) = read_name(bytes, 5).unwrap();
        assert_eq!(name, "example.lab.");
        // cursor lands right after the pointer, not at the jump target
        assert_eq!(pos, bytes.len());
    }

    #[test]
    fn rejects_forward_and_self_pointers() {
        let err = read_name(b"\xC0\x00", 0).unwrap_err();
        assert_eq!(err, PacketError::ForwardPointer { at: 0, target: 0 });

        let err = read_name(b"\xC0\x04\x00\x00\x03lab\x00", 0).unwrap_err();
        assert_eq!(err, PacketError::ForwardPointer { at: 0, target: 4 });
    }

    #[test]
    fn limits_pointer_chains() {
        // each pointer jumps two bytes back
        let mut bytes = vec![0x00, 0x00];
        for i in 0..8u8 {
            bytes.extend_from_slice(&[0xC0, i * 2]);
        }
        let start = bytes.len() - 2;
        let err = read_name(&bytes, start).unwrap_err();
        assert_eq!(err, PacketError::TooManyJumps(5));
    }

    #[test]
    fn rejects_reserved_label_types() {
        assert_eq!(
            read_name(b"\x41abc\x00", 0).unwrap_err(),
            PacketError::LabelType(0x40)
        );
        assert_eq!(
            read_name(b"\x81abc\x00", 0).unwrap_err(),
            PacketError::LabelType(0x80)
        );
    }

    #[test]
    fn stops_at_datagram_end() {
        assert_eq!(
            read_name(b"\x07exam", 0).unwrap_err(),
            PacketError::EndOfBuffer
        );
        assert_eq!(
            read_name(b"\x03lab", 0).unwrap_err(),
            PacketError::EndOfBuffer
        );

        let mut buffer = PacketBuffer::from_slice(&[0x12]).unwrap();
        assert_eq!(buffer.read_u16().unwrap_err(), PacketError::EndOfBuffer);
    }

    #[test]
    fn escapes_unusual_label_bytes() {
        let (name, _) = read_name(b"\x05a.b\\\x01\x03lab\x00", 0).unwrap();
        assert_eq!(name, "a\\.b\\\\\\001.lab.");

        let mut buffer = PacketBuffer::new();
        buffer.write_qname(&name).unwrap();
        assert_eq!(buffer.as_slice(), b"\x05a.b\\\x01\x03lab\x00");
    }

    #[test]
    fn writes_name_with_or_without_trailing_dot() {
        let mut with_dot = PacketBuffer::new();
        with_dot.write_qname("example.lab.").unwrap();

        let mut without_dot = PacketBuffer::new();
        without_dot.write_qname("example.lab").unwrap();

        assert_eq!(with_dot.as_slice(), b"\x07example\x03lab\x00");
        assert_eq!(with_dot.as_slice(), without_dot.as_slice());
    }

    #[test]
    fn compresses_repeated_names() {
        let mut buffer = PacketBuffer::new();
        buffer.write_u16(0xABCD).unwrap();
        buffer.write_qname("example.lab.").unwrap();
        buffer.write_qname("example.lab.").unwrap();
        buffer.write_qname("other.lab.").unwrap();

        let mut expected = vec![0xAB, 0xCD];
        expected.extend_from_slice(b"\x07example\x03lab\x00");
        expected.extend_from_slice(&[0xC0, 0x02]);
        expected.extend_from_slice(b"\x05other\x03lab\x00");
        assert_eq!(buffer.as_slice(), &expected[..]);
    }

    #[test]
    fn rejects_bad_names_on_write() {
        let mut buffer = PacketBuffer::new();

        assert!(matches!(
            buffer.write_qname("a..lab."),
            Err(PacketError::EmptyLabel(_))
        ));
        assert!(matches!(
            buffer.write_qname("bad\\9.lab."),
            Err(PacketError::InvalidEscape(_))
        ));
        assert!(matches!(
            buffer.write_qname("bad\\300.lab."),
            Err(PacketError::InvalidEscape(_))
        ));

        let long_label = "a".repeat(64);
        assert_eq!(
            buffer.write_qname(&long_label),
            Err(PacketError::LabelTooLong(64))
        );

        let long_name = vec!["a".repeat(63); 4].join(".");
        assert_eq!(
            buffer.write_qname(&long_name),
            Err(PacketError::NameTooLong(257))
        );
    }

    #[test]
    fn refuses_to_write_past_the_end() {
        let mut buffer = PacketBuffer::new();
        buffer.seek(PacketBuffer::LEN - 1);
        assert_eq!(buffer.write_u16(1), Err(PacketError::EndOfBuffer));
        assert!(buffer.write_u8(1).is_ok());
    }

    #[test]
    fn rejects_oversized_datagrams() {
        let data = vec![0u8; PacketBuffer::LEN + 1];
        assert!(PacketBuffer::from_slice(&data).is_err());
    }
}
