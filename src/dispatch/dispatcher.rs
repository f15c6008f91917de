// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::shared_memory::{SharedMemory, SharedMemoryKey};
use crate::engines::EngineData;
use crate::errors::{DispatchError, TransportError};
use crate::name::CanonicalName;
use crate::protocol::{DataLocation, Message, Topic};
use crate::transport::Transport;

/// How a payload reached its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Stored in shared memory; only a pointer message was published.
    SharedMemory,
    /// Published in full; `bytes` is the payload size.
    Network { bytes: usize },
}

/// Sends service output to other services and resolves inbound payloads.
///
/// The path is chosen from the addresses alone, never from payload size:
/// shared memory when both services live on the same DPE and the receiver is
/// deployed there, the network otherwise.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    shared_memory: Arc<SharedMemory>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, shared_memory: Arc<SharedMemory>) -> Self {
        Self {
            transport,
            shared_memory,
        }
    }

    pub fn shared_memory(&self) -> &Arc<SharedMemory> {
        &self.shared_memory
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub async fn send(
        &self,
        from: &CanonicalName,
        to: &CanonicalName,
        composition: &str,
        data: &EngineData,
    ) -> Result<Delivery, TransportError> {
        let topic = Topic::of(to);
        if from.same_dpe(to) {
            let key = SharedMemoryKey {
                receiver: to.clone(),
                sender: from.clone(),
                communication_id: data.communication_id,
            };
            // Refused when `to` is not deployed here; the network path then
            // leaves nothing behind.
            if self.shared_memory.put(key.clone(), data.clone()) {
                let pointer = Message::data(topic, from, composition, data, DataLocation::SharedMemory);
                if let Err(e) = self.transport.publish(pointer).await {
                    self.shared_memory.take(&key);
                    return Err(e);
                }
                return Ok(Delivery::SharedMemory);
            }
        }
        let message = Message::data(topic, from, composition, data, DataLocation::Network);
        let bytes = message.data.len();
        self.transport.publish(message).await?;
        Ok(Delivery::Network { bytes })
    }

    /// Engine data for a message `receiver` got from `sender`, taken from
    /// shared memory when the message is a pointer.
    pub fn resolve(
        &self,
        receiver: &CanonicalName,
        sender: &CanonicalName,
        message: &Message,
    ) -> Result<EngineData, DispatchError> {
        match message.meta.data_location() {
            DataLocation::Network => Ok(message.engine_data()),
            DataLocation::SharedMemory => {
                let key = SharedMemoryKey {
                    receiver: receiver.clone(),
                    sender: sender.clone(),
                    communication_id: message.meta.communication_id,
                };
                let mut data = self.shared_memory.take(&key).ok_or_else(|| {
                    DispatchError::MissingSharedMemoryEntry {
                        receiver: receiver.to_string(),
                        sender: sender.to_string(),
                        communication_id: key.communication_id,
                    }
                })?;
                // The pointer carries the sender state the entry was written with.
                if data.state.is_none() {
                    data.state = message.meta.sender_state.clone();
                }
                Ok(data)
            }
        }
    }
}
