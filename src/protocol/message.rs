// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message envelope and metadata.
//!
//! Metadata and envelope are `prost` messages so that whatever crosses a DPE
//! boundary is a compact protobuf encoding; payload bytes are carried as-is.

use prost::Message as _;

use super::{Severity, Topic};
use crate::engines::EngineData;
use crate::errors::{EngineFailure, TransportError};
use crate::name::CanonicalName;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Action {
    Execute = 0,
    Configure = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Status {
    Info = 0,
    Warning = 1,
    Error = 2,
}

/// Where the receiver finds the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DataLocation {
    /// Payload bytes travel in the message.
    Network = 0,
    /// The message is a pointer; the payload sits in the receiving DPE's
    /// shared-memory table under `(receiver, sender, communication_id)`.
    SharedMemory = 1,
}

/// How a configure request waits for the engine pool to become idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ConfigureMode {
    Blocking = 0,
    Immediate = 1,
    WithTimeout = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Meta {
    /// Canonical name of the publisher.
    #[prost(string, tag = "1")]
    pub author: String,
    #[prost(string, tag = "2")]
    pub composition: String,
    #[prost(int64, tag = "3")]
    pub communication_id: i64,
    #[prost(enumeration = "Action", tag = "4")]
    pub action: i32,
    /// Last reported state of the author, read by conditional routing.
    #[prost(string, optional, tag = "5")]
    pub sender_state: Option<String>,
    #[prost(enumeration = "Status", tag = "6")]
    pub status: i32,
    #[prost(uint32, tag = "7")]
    pub severity: u32,
    #[prost(string, tag = "8")]
    pub description: String,
    #[prost(string, optional, tag = "9")]
    pub reply_to: Option<String>,
    #[prost(string, tag = "10")]
    pub mime_type: String,
    #[prost(enumeration = "DataLocation", tag = "11")]
    pub data_location: i32,
    #[prost(enumeration = "ConfigureMode", tag = "12")]
    pub configure_mode: i32,
    #[prost(uint64, tag = "13")]
    pub configure_timeout_ms: u64,
    #[prost(uint64, tag = "14")]
    pub execution_time_ms: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct Envelope {
    #[prost(string, tag = "1")]
    topic: String,
    #[prost(message, optional, tag = "2")]
    meta: Option<Meta>,
    #[prost(bytes = "vec", tag = "3")]
    data: Vec<u8>,
}

/// A published message: topic, metadata and payload bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub topic: Topic,
    pub meta: Meta,
    pub data: Vec<u8>,
}

impl Message {
    pub fn new(topic: Topic, meta: Meta, data: Vec<u8>) -> Self {
        Self { topic, meta, data }
    }

    /// Serialise for the wire.
    pub fn encode(&self) -> Vec<u8> {
        Envelope {
            topic: self.topic.as_str().to_string(),
            meta: Some(self.meta.clone()),
            data: self.data.clone(),
        }
        .encode_to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, TransportError> {
        let envelope = Envelope::decode(bytes)?;
        Ok(Self {
            topic: Topic::new(envelope.topic),
            meta: envelope.meta.unwrap_or_default(),
            data: envelope.data,
        })
    }

    /// Build a data message carrying `data` from `author` to `topic`.
    pub fn data(
        topic: Topic,
        author: &CanonicalName,
        composition: &str,
        data: &EngineData,
        location: DataLocation,
    ) -> Self {
        let mut meta = Meta {
            author: author.to_string(),
            composition: composition.to_string(),
            communication_id: data.communication_id,
            sender_state: data.state.clone(),
            description: data.description.clone(),
            mime_type: data.mime_type.clone(),
            ..Default::default()
        };
        meta.set_action(Action::Execute);
        meta.set_data_location(location);
        let payload = match location {
            DataLocation::Network => data.payload.clone(),
            DataLocation::SharedMemory => Vec::new(),
        };
        Self::new(topic, meta, payload)
    }

    /// Build a control command addressed to the DPE `dpe`.
    pub fn control(dpe: &CanonicalName, author: &CanonicalName, command: &str) -> Self {
        let meta = Meta {
            author: author.to_string(),
            mime_type: EngineData::TEXT.to_string(),
            ..Default::default()
        };
        Self::new(Topic::control(dpe), meta, command.as_bytes().to_vec())
    }

    /// Payload interpreted as UTF-8 text.
    pub fn text(&self) -> Result<&str, TransportError> {
        std::str::from_utf8(&self.data).map_err(|e| TransportError::Codec(e.to_string()))
    }

    /// The engine data carried inline in this message.
    pub fn engine_data(&self) -> EngineData {
        EngineData {
            mime_type: self.meta.mime_type.clone(),
            payload: self.data.clone(),
            description: self.meta.description.clone(),
            state: self.meta.sender_state.clone(),
            communication_id: self.meta.communication_id,
        }
    }

    /// Build the reply to this request, if the requester asked for one.
    pub fn reply_with(&self, author: &CanonicalName, data: &EngineData) -> Option<Message> {
        let reply_to = self.meta.reply_to.as_ref()?;
        let mut reply = Message::data(
            Topic::new(reply_to.clone()),
            author,
            &self.meta.composition,
            data,
            DataLocation::Network,
        );
        reply.meta.set_status(Status::Info);
        Some(reply)
    }

    /// Build an error-status reply to this request, if one was asked for.
    pub fn reply_with_error(&self, author: &CanonicalName, failure: &EngineFailure) -> Option<Message> {
        let reply_to = self.meta.reply_to.as_ref()?;
        let mut meta = Meta {
            author: author.to_string(),
            composition: self.meta.composition.clone(),
            communication_id: self.meta.communication_id,
            severity: failure.severity.as_u32(),
            description: failure.message.clone(),
            mime_type: EngineData::TEXT.to_string(),
            ..Default::default()
        };
        meta.set_status(Status::Error);
        Some(Message::new(
            Topic::new(reply_to.clone()),
            meta,
            failure.message.as_bytes().to_vec(),
        ))
    }

    /// Error carried by an error-status message, if any.
    pub fn failure(&self) -> Option<EngineFailure> {
        (self.meta.status() == Status::Error).then(|| {
            EngineFailure::new(
                Severity::from_u32(self.meta.severity),
                self.meta.description.clone(),
            )
        })
    }
}
