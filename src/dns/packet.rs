use std::net::Ipv4Addr;

use crate::error::PacketError;
use crate::packetbuff::PacketBuffer;

use super::{header::DnsHeader, question::DnsQuestion, record::DnsRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsPacket {
    pub header: DnsHeader,
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<DnsRecord>,
    pub authorities: Vec<DnsRecord>,
    pub additionals: Vec<DnsRecord>,
}

impl DnsPacket {
    pub fn new() -> Self {
        DnsPacket {
            header: DnsHeader::new(),
            questions: Vec::new(),
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        }
    }

    // get the first A record from the answers
    pub fn get_any_a(&self) -> Option<Ipv4Addr> {
        self.answers.iter().find_map(|answer| match answer {
            DnsRecord::A { addr, .. } => Some(*addr),
            _ => None,
        })
    }

    // header and question section only, the cursor is left at the first record.
    // counts come straight off the wire, so sections grow as they are read
    // rather than being preallocated
    pub fn read_query(buf: &mut PacketBuffer) -> Result<Self, PacketError> {
        let header = DnsHeader::read(buf)?;

        let mut questions = Vec::new();
        for _ in 0..header.qdcount {
            questions.push(DnsQuestion::read(buf)?);
        }

        Ok(DnsPacket {
            header,
            questions,
            ..DnsPacket::new()
        })
    }

    pub fn read(buf: &mut PacketBuffer) -> Result<Self, PacketError> {
        let DnsPacket {
            header, questions, ..
        } = DnsPacket::read_query(buf)?;

        let mut answers = Vec::new();
        for _ in 0..header.ancount {
            answers.push(DnsRecord::read(buf)?);
        }

        let mut authorities = Vec::new();
        for _ in 0..header.nscount {
            authorities.push(DnsRecord::read(buf)?);
        }

        let mut additionals = Vec::new();
        for _ in 0..header.arcount {
            additionals.push(DnsRecord::read(buf)?);
        }

        Ok(DnsPacket {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, PacketError> {
        let mut buffer = PacketBuffer::from_slice(data)?;
        DnsPacket::read(&mut buffer)
    }

    // what a responder needs from an incoming datagram: header and questions
    // out of the first 512 bytes, everything past the questions is ignored
    pub fn query_from_bytes(data: &[u8]) -> Result<Self, PacketError> {
        let data = &data[..data.len().min(PacketBuffer::LEN)];
        let mut buffer = PacketBuffer::from_slice(data)?;
        DnsPacket::read_query(&mut buffer)
    }

    // counts are maintained by the add_* helpers
    pub fn write(&self, buf: &mut PacketBuffer) -> Result<(), PacketError> {
        self.header.write(buf)?;

        for q in &self.questions {
            q.write(buf)?;
        }

        for a in &self.answers {
            a.write(buf)?;
        }

        for a in &self.authorities {
            a.write(buf)?;
        }

        for a in &self.additionals {
            a.write(buf)?;
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PacketError> {
        let mut buffer = PacketBuffer::new();
        self.write(&mut buffer)?;
        Ok(buffer.as_slice().to_vec())
    }

    pub fn add_question(&mut self, question: DnsQuestion) {
        self.questions.push(question);
        self.header.qdcount += 1;
    }

    pub fn add_answer(&mut self, answer: DnsRecord) {
        self.answers.push(answer);
        self.header.ancount += 1;
    }
}
