//! Control-surface bridge to the DAW over OSC/UDP.
//!
//! Speaks the AbletonOSC wiring: commands go to the application's listen
//! port, replies come back on a second local port, and a reply's OSC
//! address equals the address of the request it answers.
//!
//! Replies carry no correlation identifier, so the send-then-wait pairs
//! ([`OscBridge::get_tempo`], [`OscBridge::set_tempo`]) are serialized
//! behind a lock; overlapping queries to one address cannot steal each
//! other's replies.

use rosc::{OscMessage, OscPacket, OscType};
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::error::BridgeError;

/// OSC address for reading the song tempo.
pub const TEMPO_GET_ADDR: &str = "/live/song/get/tempo";

/// OSC address for writing the song tempo.
pub const TEMPO_SET_ADDR: &str = "/live/song/set/tempo";

/// Default peer host (the DAW runs next to us).
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port the DAW listens on for commands.
pub const DEFAULT_SEND_PORT: u16 = 11000;

/// Default local port the DAW delivers replies to.
pub const DEFAULT_RECV_PORT: u16 = 11001;

/// Network endpoints for the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Host the DAW's OSC server runs on.
    pub host: String,
    /// Port the DAW listens on for commands.
    pub send_port: u16,
    /// Local port replies are delivered to (`0` picks an ephemeral port).
    pub recv_port: u16,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            send_port: DEFAULT_SEND_PORT,
            recv_port: DEFAULT_RECV_PORT,
        }
    }
}

impl BridgeConfig {
    /// Returns the peer address commands are sent to.
    #[must_use]
    pub fn peer_addr(&self) -> String {
        format!("{}:{}", self.host, self.send_port)
    }

    /// Returns the local address the reply socket binds.
    #[must_use]
    pub fn local_addr(&self) -> String {
        format!("0.0.0.0:{}", self.recv_port)
    }
}

/// UDP request/reply channel to the external music application.
pub struct OscBridge {
    socket: UdpSocket,
    peer: String,
    // Held across each send-then-wait pair; see module docs.
    query_lock: Mutex<()>,
}

impl OscBridge {
    /// Binds the reply socket and fixes the peer address.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Bind`] if the local reply port cannot be
    /// bound.
    pub async fn connect(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let local = config.local_addr();
        let socket = UdpSocket::bind(&local)
            .await
            .map_err(|e| BridgeError::Bind {
                addr: local,
                reason: e.to_string(),
            })?;
        debug!(peer = %config.peer_addr(), local = ?socket.local_addr(), "bridge connected");
        Ok(Self {
            socket,
            peer: config.peer_addr(),
            query_lock: Mutex::new(()),
        })
    }

    /// Returns the local address of the reply socket.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Receive`] if the socket's address cannot be
    /// read.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, BridgeError> {
        Ok(self.socket.local_addr()?)
    }

    /// Writes one OSC message to the peer, fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Encode`] if the message cannot be encoded
    /// and [`BridgeError::Send`] if the write fails. Delivery is never
    /// acknowledged.
    pub async fn send(&self, addr: &str, args: Vec<OscType>) -> Result<(), BridgeError> {
        let packet = OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args,
        });
        let bytes =
            rosc::encoder::encode(&packet).map_err(|e| BridgeError::Encode(e.to_string()))?;
        trace!(addr, bytes = bytes.len(), "sending packet");
        self.socket
            .send_to(&bytes, &self.peer)
            .await
            .map_err(|e| BridgeError::Send {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Resolves with the first inbound message matching `addr`.
    ///
    /// Packets for other addresses are skipped. There is no timeout: an
    /// unanswered query blocks forever.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Receive`] on socket failure and
    /// [`BridgeError::Decode`] on an undecodable packet.
    pub async fn wait_for(&self, addr: &str) -> Result<OscMessage, BridgeError> {
        let mut buf = [0u8; rosc::decoder::MTU];
        loop {
            let (len, source) = self.socket.recv_from(&mut buf).await?;
            let (_, packet) = rosc::decoder::decode_udp(&buf[..len])?;
            match find_message(packet, addr) {
                Some(message) => {
                    trace!(addr, %source, "matched reply");
                    return Ok(message);
                }
                None => trace!(addr, %source, "skipping non-matching packet"),
            }
        }
    }

    /// Reads the song tempo: send-then-wait on the get-tempo address.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] on send/receive failure or a reply with
    /// no numeric payload.
    pub async fn get_tempo(&self) -> Result<f32, BridgeError> {
        let _guard = self.query_lock.lock().await;
        self.send(TEMPO_GET_ADDR, Vec::new()).await?;
        let reply = self.wait_for(TEMPO_GET_ADDR).await?;
        extract_tempo(&reply)
    }

    /// Writes the song tempo and returns the value the peer echoes back.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] on send/receive failure or a reply with
    /// no numeric payload.
    pub async fn set_tempo(&self, bpm: f32) -> Result<f32, BridgeError> {
        let _guard = self.query_lock.lock().await;
        self.send(TEMPO_SET_ADDR, vec![OscType::Float(bpm)]).await?;
        let reply = self.wait_for(TEMPO_SET_ADDR).await?;
        extract_tempo(&reply)
    }
}

/// Searches a packet (message or bundle) for a message addressed `addr`.
fn find_message(packet: OscPacket, addr: &str) -> Option<OscMessage> {
    match packet {
        OscPacket::Message(message) => (message.addr == addr).then_some(message),
        OscPacket::Bundle(bundle) => bundle
            .content
            .into_iter()
            .find_map(|inner| find_message(inner, addr)),
    }
}

/// Reads the tempo from the first numeric argument of a reply.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn extract_tempo(message: &OscMessage) -> Result<f32, BridgeError> {
    match message.args.first() {
        Some(OscType::Float(value)) => Ok(*value),
        Some(OscType::Double(value)) => Ok(*value as f32),
        Some(OscType::Int(value)) => Ok(*value as f32),
        Some(OscType::Long(value)) => Ok(*value as f32),
        _ => Err(BridgeError::MalformedReply {
            addr: message.addr.clone(),
            reason: "no numeric argument".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use rosc::OscBundle;
    use test_case::test_case;

    use super::*;

    fn message(addr: &str, args: Vec<OscType>) -> OscMessage {
        OscMessage {
            addr: addr.to_string(),
            args,
        }
    }

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.peer_addr(), "127.0.0.1:11000");
        assert_eq!(config.local_addr(), "0.0.0.0:11001");
    }

    #[test_case(OscType::Float(120.0), 120.0; "float argument")]
    #[test_case(OscType::Double(98.5), 98.5; "double argument")]
    #[test_case(OscType::Int(140), 140.0; "int argument")]
    #[test_case(OscType::Long(90), 90.0; "long argument")]
    fn test_extract_tempo_numeric(arg: OscType, expected: f32) {
        let reply = message(TEMPO_GET_ADDR, vec![arg]);
        let tempo = extract_tempo(&reply).unwrap();
        assert!((tempo - expected).abs() < f32::EPSILON);
    }

    #[test]
    fn test_extract_tempo_rejects_empty_reply() {
        let reply = message(TEMPO_GET_ADDR, Vec::new());
        let err = extract_tempo(&reply).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedReply { .. }));
    }

    #[test]
    fn test_extract_tempo_rejects_non_numeric_reply() {
        let reply = message(TEMPO_GET_ADDR, vec![OscType::String("fast".to_string())]);
        assert!(extract_tempo(&reply).is_err());
    }

    #[test]
    fn test_find_message_direct() {
        let packet = OscPacket::Message(message(TEMPO_GET_ADDR, vec![OscType::Float(120.0)]));
        let found = find_message(packet, TEMPO_GET_ADDR).unwrap();
        assert_eq!(found.addr, TEMPO_GET_ADDR);
    }

    #[test]
    fn test_find_message_skips_other_addresses() {
        let packet = OscPacket::Message(message("/live/song/get/is_playing", vec![]));
        assert!(find_message(packet, TEMPO_GET_ADDR).is_none());
    }

    #[test]
    fn test_find_message_in_bundle() {
        let bundle = OscPacket::Bundle(OscBundle {
            timetag: rosc::OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![
                OscPacket::Message(message("/live/song/get/is_playing", vec![])),
                OscPacket::Message(message(TEMPO_GET_ADDR, vec![OscType::Float(120.0)])),
            ],
        });
        let found = find_message(bundle, TEMPO_GET_ADDR).unwrap();
        assert_eq!(found.args.len(), 1);
    }
}
