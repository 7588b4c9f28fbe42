pub mod config;
pub mod dns;
pub mod error;
pub mod packetbuff;
pub mod responder;
pub mod server;
pub mod zone;

pub use config::{CliOverrides, Config};
pub use error::{ConfigError, HandleError, PacketError, ZoneError};
pub use responder::{Responder, DEFAULT_TTL};
pub use server::Server;
pub use zone::{Zone, ZoneEntry};
