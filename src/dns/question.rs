use std::fmt;

use crate::error::PacketError;
use crate::packetbuff::PacketBuffer;

/// The Internet class, the only one answers are ever produced for.
pub const CLASS_IN: u16 = 1;

#[derive(PartialEq, Eq, Debug, Clone, Hash, Copy)]
pub enum QueryType {
    UNKNOWN(u16),
    A,     // 1
    NS,    // 2
    CNAME, // 5
    SOA,   // 6
    PTR,   // 12
    MX,    // 15
    TXT,   // 16
    AAAA,  // 28
    SRV,   // 33
    OPT,   // 41
    ANY,   // 255
}

impl QueryType {
    #[inline]
    pub fn from_u16(val: u16) -> QueryType {
        match val {
            1 => QueryType::A,
            2 => QueryType::NS,
            5 => QueryType::CNAME,
            6 => QueryType::SOA,
            12 => QueryType::PTR,
            15 => QueryType::MX,
            16 => QueryType::TXT,
            28 => QueryType::AAAA,
            33 => QueryType::SRV,
            41 => QueryType::OPT,
            255 => QueryType::ANY,
            _ => QueryType::UNKNOWN(val),
        }
    }

    #[inline]
    pub fn to_u16(&self) -> u16 {
        match self {
            QueryType::A => 1,
            QueryType::NS => 2,
            QueryType::CNAME => 5,
            QueryType::SOA => 6,
            QueryType::PTR => 12,
            QueryType::MX => 15,
            QueryType::TXT => 16,
            QueryType::AAAA => 28,
            QueryType::SRV => 33,
            QueryType::OPT => 41,
            QueryType::ANY => 255,
            QueryType::UNKNOWN(val) => *val,
        }
    }
}

/// Mnemonic form, `TYPE<n>` for codes without one.
impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::UNKNOWN(val) => write!(f, "TYPE{}", val),
            known => fmt::Debug::fmt(known, f),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct DnsQuestion {
    pub qname: String,
    pub qtype: QueryType,
    pub qclass: u16,
}

impl DnsQuestion {
    pub fn new(qname: String, qtype: QueryType) -> Self {
        DnsQuestion {
            qname,
            qtype,
            qclass: CLASS_IN,
        }
    }

    pub fn read(buf: &mut PacketBuffer) -> Result<Self, PacketError> {
        let mut qname = String::with_capacity(256);
        buf.read_qname(&mut qname)?;

        let qtype = QueryType::from_u16(buf.read_u16()?);
        let qclass = buf.read_u16()?;

        Ok(DnsQuestion {
            qname,
            qtype,
            qclass,
        })
    }

    pub fn write(&self, buf: &mut PacketBuffer) -> Result<(), PacketError> {
        buf.write_qname(&self.qname)?;
        buf.write_u16(self.qtype.to_u16())?;
        buf.write_u16(self.qclass)?;
        Ok(())
    }
}
