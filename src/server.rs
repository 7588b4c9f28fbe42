use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::{debug, error, info, warn};

use crate::responder::Responder;

/// Sequential UDP front end: receive a datagram, answer it, send the reply
/// back to where it came from.
pub struct Server {
    socket: UdpSocket,
    responder: Responder,
}

impl Server {
    // room for anything a client may send, only the first 512 bytes are parsed
    const RECV_LEN: usize = 8192;

    pub fn bind<A: ToSocketAddrs>(addr: A, responder: Responder) -> io::Result<Server> {
        let socket = UdpSocket::bind(addr)?;
        info!(addr = %socket.local_addr()?, names = responder.zone().len(), "listening");

        Ok(Server { socket, responder })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Handle exactly one datagram. Only receive errors are returned, a
    /// datagram that cannot be answered or whose reply cannot be sent is
    /// logged and dropped.
    pub fn serve_one(&self) -> io::Result<()> {
        let mut buf = [0; Self::RECV_LEN];
        let (size, src) = self.socket.recv_from(&mut buf)?;

        self.respond(&buf[..size], src);

        Ok(())
    }

    fn respond(&self, datagram: &[u8], src: SocketAddr) {
        let reply = match self.responder.handle(datagram) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(%src, bytes = datagram.len(), error = %e, "dropping datagram");
                return;
            }
        };

        match self.socket.send_to(&reply, src) {
            Ok(_) => debug!(%src, bytes = reply.len(), "sent reply"),
            Err(e) => warn!(%src, error = %e, "failed to send reply"),
        }
    }

    /// Serve until the socket fails for good. Transient receive errors,
    /// such as ICMP unreachable reports surfacing on the next read, are
    /// logged and skipped.
    pub fn run(&self) -> io::Result<()> {
        loop {
            match self.serve_one() {
                Ok(()) => {}
                Err(e) if is_transient(&e) => debug!(error = %e, "transient receive error"),
                Err(e) => {
                    error!(error = %e, "udp socket error");
                    return Err(e);
                }
            }
        }
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
    )
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::config::Config;
    use crate::dns::{DnsPacket, DnsQuestion, QueryType};

    fn server() -> Server {
        let responder = Responder::from_config(&Config::default()).unwrap();
        Server::bind("127.0.0.1:0", responder).unwrap()
    }

    fn query_bytes(id: u16) -> Vec<u8> {
        let mut packet = DnsPacket::new();
        packet.header.id = id;
        packet.add_question(DnsQuestion::new("example.lab.".into(), QueryType::A));
        packet.to_bytes().unwrap()
    }

    #[test]
    fn classifies_receive_errors() {
        for kind in [
            io::ErrorKind::Interrupted,
            io::ErrorKind::WouldBlock,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionRefused,
        ] {
            assert!(is_transient(&io::Error::from(kind)), "{kind:?}");
        }

        for kind in [
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::InvalidInput,
            io::ErrorKind::NotConnected,
        ] {
            assert!(!is_transient(&io::Error::from(kind)), "{kind:?}");
        }
    }

    #[test]
    fn send_failure_does_not_stop_serving() {
        let server = server();
        let addr = server.local_addr().unwrap();

        // an IPv4 socket cannot send to an IPv6 peer
        server.respond(&query_bytes(1), "[::1]:53".parse().unwrap());

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        client.send_to(&query_bytes(2), addr).unwrap();

        thread::spawn(move || server.run());

        let mut buf = [0; 512];
        let (size, _) = client.recv_from(&mut buf).unwrap();
        let reply = DnsPacket::from_bytes(&buf[..size]).unwrap();
        assert_eq!(reply.header.id, 2);
        assert_eq!(reply.get_any_a(), Some(Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[test]
    fn serve_one_reports_receive_timeouts() {
        let server = server();
        server
            .socket
            .set_read_timeout(Some(Duration::from_millis(50)))
            .unwrap();

        let err = server.serve_one().unwrap_err();
        assert!(is_transient(&err), "{err:?}");
    }
}
