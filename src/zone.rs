use std::collections::HashMap;
use std::net::Ipv4Addr;

use serde::Deserialize;

use crate::error::ZoneError;
use crate::packetbuff::validate_name;

/// One `name -> address` mapping as it appears in configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ZoneEntry {
    pub name: String,
    pub address: String,
}

impl ZoneEntry {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// The names this server is authoritative for. Built once, read-only after.
#[derive(Debug, Clone, Default)]
pub struct Zone {
    records: HashMap<String, Ipv4Addr>,
}

impl Zone {
    pub fn new<I>(entries: I) -> Result<Self, ZoneError>
    where
        I: IntoIterator<Item = ZoneEntry>,
    {
        let mut records = HashMap::new();

        for ZoneEntry { name, address } in entries {
            if !name.ends_with('.') {
                return Err(ZoneError::NotFullyQualified(name));
            }

            if let Err(reason) = validate_name(&name) {
                return Err(ZoneError::InvalidName { name, reason });
            }

            let addr: Ipv4Addr = address
                .parse()
                .map_err(|_| ZoneError::InvalidAddress {
                    name: name.clone(),
                    address: address.clone(),
                })?;

            if records.contains_key(&name) {
                return Err(ZoneError::DuplicateName(name));
            }
            records.insert(name, addr);
        }

        Ok(Self { records })
    }

    /// Exact, case-sensitive match on the fully qualified name.
    pub fn lookup(&self, name: &str) -> Option<Ipv4Addr> {
        self.records.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
