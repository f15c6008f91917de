// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::task::JoinHandle;

use super::Dpe;
use crate::errors::TransportError;
use crate::observability::messages::dpe::{ControlCommandFailed, DpeStarted};
use crate::observability::messages::StructuredLog;
use crate::protocol::control::STOP_DPE;
use crate::protocol::Topic;

/// A DPE serving its control topic.
///
/// Control commands are applied one at a time in arrival order. The loop
/// ends on [`DpeHandle::stop`] or a `STOP_DPE` addressed to this DPE, after
/// which every container is stopped.
pub struct DpeHandle {
    dpe: Arc<Dpe>,
    task: JoinHandle<()>,
}

impl DpeHandle {
    pub(super) async fn start(dpe: Arc<Dpe>) -> Result<Self, TransportError> {
        let context = dpe.context();
        let mut control = context.transport.subscribe(Topic::control(dpe.name())).await?;
        context.registrar.register(dpe.name(), "dpe").await?;
        DpeStarted {
            dpe: &dpe.name().to_string(),
            front_end: &dpe.front_end().to_string(),
        }
        .log();

        let task = {
            let dpe = Arc::clone(&dpe);
            tokio::spawn(async move {
                let token = dpe.shutdown_token().clone();
                loop {
                    let message = tokio::select! {
                        _ = token.cancelled() => break,
                        message = control.recv() => message,
                    };
                    match message {
                        Some(message) => dpe.handle_control(&message).await,
                        None => break,
                    }
                }
                if let Err(e) = dpe.shutdown().await {
                    ControlCommandFailed {
                        dpe: &dpe.name().to_string(),
                        command: STOP_DPE,
                        error: &e,
                    }
                    .log();
                }
            })
        };

        Ok(Self { dpe, task })
    }

    pub fn dpe(&self) -> &Arc<Dpe> {
        &self.dpe
    }

    /// Shut the DPE down and wait until its containers are stopped.
    pub async fn stop(self) {
        self.dpe.shutdown_token().cancel();
        let _ = self.task.await;
    }

    /// Wait until the DPE is told to stop.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}
