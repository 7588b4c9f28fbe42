use tracing::debug;

use crate::config::Config;
use crate::dns::{DnsPacket, DnsRecord, QueryType, ResultCode};
use crate::error::{ConfigError, HandleError};
use crate::zone::Zone;

/// TTL of every answer unless configured otherwise.
pub const DEFAULT_TTL: u32 = 60;

/// Turns one query datagram into one reply datagram using a fixed zone.
///
/// Holds no per-request state, so a single instance can serve any number of
/// queries, from any number of threads.
#[derive(Debug, Clone)]
pub struct Responder {
    zone: Zone,
    ttl: u32,
    nxdomain_on_miss: bool,
}

impl Responder {
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            ttl: DEFAULT_TTL,
            nxdomain_on_miss: false,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.build_zone()?)
            .with_ttl(config.zone.ttl)
            .with_nxdomain_on_miss(config.zone.nxdomain_on_miss))
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_nxdomain_on_miss(mut self, enabled: bool) -> Self {
        self.nxdomain_on_miss = enabled;
        self
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Parse `datagram`, answer it, and return the serialized reply.
    ///
    /// Only the header and question section are read, and only out of the
    /// first 512 bytes, so oversized or EDNS padded queries are still answered.
    pub fn handle(&self, datagram: &[u8]) -> Result<Vec<u8>, HandleError> {
        let query = DnsPacket::query_from_bytes(datagram).map_err(HandleError::Malformed)?;
        let reply = self.reply(&query)?;
        reply.to_bytes().map_err(HandleError::Serialize)
    }

    /// Build the reply for an already parsed query.
    ///
    /// Only the first question is answered and echoed back. The header keeps
    /// the query id, sets QR and leaves every other flag clear. A miss is an
    /// empty NOERROR reply unless NXDOMAIN was asked for.
    pub fn reply(&self, query: &DnsPacket) -> Result<DnsPacket, HandleError> {
        let question = query.questions.first().ok_or(HandleError::NoQuestion)?;

        if query.questions.len() > 1 {
            debug!(
                id = query.header.id,
                count = query.questions.len(),
                "ignoring all but the first question"
            );
        }

        let mut reply = DnsPacket::new();
        reply.header.id = query.header.id;
        reply.header.qr = true;
        reply.add_question(question.clone());

        match self.zone.lookup(&question.qname) {
            Some(addr) if matches!(question.qtype, QueryType::A | QueryType::ANY) => {
                reply.add_answer(DnsRecord::A {
                    domain: question.qname.clone(),
                    addr,
                    ttl: self.ttl,
                });
            }
            None if self.nxdomain_on_miss => {
                reply.header.set_result_code(ResultCode::NXDOMAIN);
            }
            _ => {}
        }

        debug!(
            id = query.header.id,
            qname = %question.qname,
            qtype = %question.qtype,
            answers = reply.answers.len(),
            "answered query"
        );

        Ok(reply)
    }
}
