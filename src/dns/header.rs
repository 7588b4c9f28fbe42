use packed_struct::prelude::*;

use crate::error::PacketError;
use crate::packetbuff::PacketBuffer;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResultCode {
    NOERROR = 0,  // no error condition
    FORMERR = 1,  // format error - the name server was unable to interpret the query
    SERVFAIL = 2, // server failure - the name server was unable to process this query due to a problem with the name server
    NXDOMAIN = 3, // name error - meaningful only for responses from an authoritative name server, this code signifies that the domain name referenced in the query does not exist
    NOTIMP = 4,   // not implemented - the name server does not support the requested kind of query
    REFUSED = 5, // refused - the name server refuses to perform the specified operation for policy reasons
}

impl ResultCode {
    // unassigned codes collapse to NOERROR
    #[inline]
    pub fn from_u8(val: u8) -> ResultCode {
        match val {
            1 => ResultCode::FORMERR,
            2 => ResultCode::SERVFAIL,
            3 => ResultCode::NXDOMAIN,
            4 => ResultCode::NOTIMP,
            5 => ResultCode::REFUSED,
            _ => ResultCode::NOERROR,
        }
    }
}

#[derive(PackedStruct, Clone, Copy, Debug, PartialEq, Eq)]
#[packed_struct(bit_numbering = "msb0")]
pub struct DnsHeader {
    #[packed_field(bits = "0..=15", endian = "msb")]
    pub id: u16, // identification number; 16 bits

    #[packed_field(bits = "16")]
    pub qr: bool, // query (0) or response (1); 1 bit

    #[packed_field(bits = "17..=20")]
    pub opcode: Integer<u8, packed_bits::Bits<4>>, // operation code; 4 bits

    #[packed_field(bits = "21")]
    pub aa: bool, // authoritative answer; 1 bit
    #[packed_field(bits = "22")]
    pub tc: bool, // truncated; 1 bit
    #[packed_field(bits = "23")]
    pub rd: bool, // recursion desired; 1 bit
    #[packed_field(bits = "24")]
    pub ra: bool, // recursion available; 1 bit

    #[packed_field(bits = "25..=27")]
    pub z: Integer<u8, packed_bits::Bits<3>>, // reserved for future use; 3 bits

    // kept as a raw nibble so that unassigned codes still parse
    #[packed_field(bits = "28..=31")]
    pub rcode: Integer<u8, packed_bits::Bits<4>>, // response code; 4 bits

    #[packed_field(bits = "32..=47", endian = "msb")]
    pub qdcount: u16, // number of entries in the question section; 16 bits
    #[packed_field(bits = "48..=63", endian = "msb")]
    pub ancount: u16, // number of resource records in the answer section; 16 bits
    #[packed_field(bits = "64..=79", endian = "msb")]
    pub nscount: u16, // number of name server resource records in the authority records section; 16 bits
    #[packed_field(bits = "80..=95", endian = "msb")]
    pub arcount: u16, // number of resource records in the additional records section; 16 bits
}

impl Default for DnsHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsHeader {
    pub const LEN: usize = 12;

    pub fn new() -> Self {
        DnsHeader {
            id: 0,
            qr: false,
            opcode: 0.into(),
            aa: false,
            tc: false,
            rd: false,
            ra: false,

            z: 0.into(),

            rcode: 0.into(),
            qdcount: 0,
            ancount: 0,
            nscount: 0,
            arcount: 0,
        }
    }

    #[inline]
    pub fn result_code(&self) -> ResultCode {
        ResultCode::from_u8(*self.rcode)
    }

    #[inline]
    pub fn set_result_code(&mut self, code: ResultCode) {
        self.rcode = (code as u8).into();
    }

    pub fn read(buf: &mut PacketBuffer) -> Result<Self, PacketError> {
        let bytes = buf.read_slice::<12>()?;
        DnsHeader::unpack(&bytes).map_err(|_| PacketError::HeaderUnpack)
    }

    pub fn write(&self, buf: &mut PacketBuffer) -> Result<(), PacketError> {
        let packed = self.pack().map_err(|_| PacketError::HeaderPack)?;
        buf.write_slice(&packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_flags_in_wire_order() {
        let mut header = DnsHeader::new();
        header.id = 0x1d49;
        header.qr = true;
        header.rd = true;
        header.set_result_code(ResultCode::NXDOMAIN);
        header.qdcount = 1;
        header.ancount = 2;

        let mut buffer = PacketBuffer::new();
        header.write(&mut buffer).unwrap();

        assert_eq!(
            buffer.as_slice(),
            &[0x1d, 0x49, 0x81, 0x03, 0x00, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn reads_header_with_unassigned_rcode() {
        let bytes = [0xbe, 0xef, 0x01, 0x2f, 0x00, 0x01, 0, 0, 0, 0, 0, 1];
        let mut buffer = PacketBuffer::from_slice(&bytes).unwrap();
        let header = DnsHeader::read(&mut buffer).unwrap();

        assert_eq!(header.id, 0xbeef);
        assert!(!header.qr);
        assert!(header.rd);
        assert!(!header.ra);
        assert_eq!(*header.z, 0b010);
        assert_eq!(*header.rcode, 0x0f);
        assert_eq!(header.result_code(), ResultCode::NOERROR);
        assert_eq!(header.qdcount, 1);
        assert_eq!(header.arcount, 1);
    }

    #[test]
    fn short_header_is_an_error() {
        let mut buffer = PacketBuffer::from_slice(&[0u8; 11]).unwrap();
        assert_eq!(DnsHeader::read(&mut buffer), Err(PacketError::EndOfBuffer));
    }
}
