use std::net::Ipv4Addr;

use crate::error::PacketError;
use crate::packetbuff::PacketBuffer;

use super::question::{QueryType, CLASS_IN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsRecord {
    // anything other than A, rdata kept as-is
    UNKNOWN {
        domain: String,
        qtype: u16,
        class: u16,
        ttl: u32,
        data: Vec<u8>,
    },
    A {
        domain: String,
        addr: Ipv4Addr,
        ttl: u32,
    }, // 1
}

impl DnsRecord {
    pub fn read(buf: &mut PacketBuffer) -> Result<Self, PacketError> {
        let mut domain = String::with_capacity(256);
        buf.read_qname(&mut domain)?;

        let qtype = buf.read_u16()?;
        let class = buf.read_u16()?;
        let ttl = buf.read_u32()?;
        let data_len = buf.read_u16()? as usize;

        match QueryType::from_u16(qtype) {
            QueryType::A if class == CLASS_IN && data_len == 4 => Ok(DnsRecord::A {
                domain,
                addr: Ipv4Addr::from(buf.read_u32()?),
                ttl,
            }),
            _ => Ok(DnsRecord::UNKNOWN {
                domain,
                qtype,
                class,
                ttl,
                data: buf.read_vec(data_len)?,
            }),
        }
    }

    pub fn write(&self, buf: &mut PacketBuffer) -> Result<usize, PacketError> {
        let start_pos = buf.pos();

        match self {
            DnsRecord::A { domain, addr, ttl } => {
                buf.write_qname(domain)?;
                buf.write_u16(QueryType::A.to_u16())?;
                buf.write_u16(CLASS_IN)?;
                buf.write_u32(*ttl)?;
                buf.write_u16(4)?; // data_len
                buf.write_slice(&addr.octets())?; // data
            }
            DnsRecord::UNKNOWN {
                domain,
                qtype,
                class,
                ttl,
                data,
            } => {
                let data_len =
                    u16::try_from(data.len()).map_err(|_| PacketError::EndOfBuffer)?;

                buf.write_qname(domain)?;
                buf.write_u16(*qtype)?;
                buf.write_u16(*class)?;
                buf.write_u32(*ttl)?;
                buf.write_u16(data_len)?;
                buf.write_bytes(data)?;
            }
        }

        Ok(buf.pos() - start_pos)
    }
}
