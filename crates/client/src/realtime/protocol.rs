//! Text framing of the Socket.IO v4 protocol over an Engine.IO v4 WebSocket.
//!
//! Only the subset the score channel uses is understood: the handshake,
//! heartbeats, namespace connect/disconnect and plain events.

use judging::dto::judging::ScoreUpdate;
use serde_json::Value;

use crate::error::{ClientError, Result};

pub const SCORE_UPDATE_EVENT: &str = "score-update";

/// Namespace connect for the default namespace.
pub const CONNECT_FRAME: &str = "40";
pub const PONG_FRAME: &str = "3";

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Value),
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, payload: Value },
    ConnectError(String),
    /// Acks and binary packets, which this client never asks for.
    Unsupported(char),
}

impl SocketPacket {
    pub fn score_update(&self) -> Option<ScoreUpdate> {
        match self {
            Self::Event { name, payload } if name == SCORE_UPDATE_EVENT => {
                serde_json::from_value(payload.clone()).ok()
            }
            _ => None,
        }
    }
}

pub fn decode(frame: &str) -> Result<EnginePacket> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ClientError::Channel("empty frame".to_string()))?;
    let rest = chars.as_str();

    Ok(match kind {
        '0' => EnginePacket::Open(serde_json::from_str(rest)?),
        '1' => EnginePacket::Close,
        '2' => EnginePacket::Ping,
        '3' => EnginePacket::Pong,
        '4' => EnginePacket::Message(decode_socket_packet(rest)?),
        '5' => EnginePacket::Upgrade,
        '6' => EnginePacket::Noop,
        other => {
            return Err(ClientError::Channel(format!(
                "unknown engine packet type '{}'",
                other
            )));
        }
    })
}

/// Strip an optional `/namespace,` prefix and an optional numeric ack id.
fn packet_body(rest: &str) -> &str {
    let rest = match rest.strip_prefix('/') {
        Some(namespaced) => namespaced.split_once(',').map_or("", |(_, body)| body),
        None => rest,
    };
    rest.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn decode_socket_packet(frame: &str) -> Result<SocketPacket> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ClientError::Channel("empty socket packet".to_string()))?;
    let body = packet_body(chars.as_str());

    Ok(match kind {
        '0' => SocketPacket::Connect(if body.is_empty() {
            None
        } else {
            Some(serde_json::from_str(body)?)
        }),
        '1' => SocketPacket::Disconnect,
        '2' => {
            let mut args: Vec<Value> = serde_json::from_str(body)?;
            if args.is_empty() {
                return Err(ClientError::Channel("event without a name".to_string()));
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                other => {
                    return Err(ClientError::Channel(format!(
                        "event name is not a string: {}",
                        other
                    )));
                }
            };
            let payload = if args.is_empty() {
                Value::Null
            } else {
                args.remove(0)
            };
            SocketPacket::Event { name, payload }
        }
        '4' => {
            let message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| body.to_string());
            SocketPacket::ConnectError(message)
        }
        other => SocketPacket::Unsupported(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use judging::RoundKey;

    #[test]
    fn test_decode_handshake_and_heartbeat() {
        let open = decode(r#"0{"sid":"abc","pingInterval":25000,"pingTimeout":20000}"#).unwrap();
        match open {
            EnginePacket::Open(v) => assert_eq!(v["sid"], "abc"),
            other => panic!("unexpected packet: {:?}", other),
        }
        assert_eq!(decode("2").unwrap(), EnginePacket::Ping);
        assert_eq!(decode("1").unwrap(), EnginePacket::Close);
        assert!(decode("").is_err());
        assert!(decode("9").is_err());
    }

    #[test]
    fn test_decode_namespace_packets() {
        assert_eq!(
            decode("40").unwrap(),
            EnginePacket::Message(SocketPacket::Connect(None))
        );
        assert!(matches!(
            decode(r#"40{"sid":"xyz"}"#).unwrap(),
            EnginePacket::Message(SocketPacket::Connect(Some(_)))
        ));
        assert_eq!(
            decode("41").unwrap(),
            EnginePacket::Message(SocketPacket::Disconnect)
        );
        assert_eq!(
            decode(r#"44{"message":"Not authorized"}"#).unwrap(),
            EnginePacket::Message(SocketPacket::ConnectError("Not authorized".to_string()))
        );
    }

    #[test]
    fn test_decode_score_update_event() {
        let packet = decode(r#"42["score-update",{"eventId":5,"roundNo":2}]"#).unwrap();
        let EnginePacket::Message(packet) = packet else {
            panic!("expected a message packet");
        };
        assert_eq!(packet.score_update(), Some(RoundKey::new(5, 2)));

        // ack ids and namespaces are tolerated
        let packet = decode(r#"42/judging,12["score-update",{"eventId":1,"roundNo":3}]"#).unwrap();
        let EnginePacket::Message(packet) = packet else {
            panic!("expected a message packet");
        };
        assert_eq!(packet.score_update(), Some(RoundKey::new(1, 3)));
    }

    #[test]
    fn test_other_events_are_not_score_updates() {
        let packet = decode(r#"42["winner-update",{"eventId":5}]"#).unwrap();
        let EnginePacket::Message(packet) = packet else {
            panic!("expected a message packet");
        };
        assert_eq!(packet.score_update(), None);

        let packet = decode(r#"42["score-update",{"eventId":"x"}]"#).unwrap();
        let EnginePacket::Message(packet) = packet else {
            panic!("expected a message packet");
        };
        assert_eq!(packet.score_update(), None);

        assert!(decode(r#"42[7]"#).is_err());
    }
}
