mod header;
mod packet;
mod question;
mod record;

pub use header::{DnsHeader, ResultCode};
pub use packet::DnsPacket;
pub use question::{DnsQuestion, QueryType, CLASS_IN};
pub use record::DnsRecord;
