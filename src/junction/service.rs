use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::junction::controller::{JunctionController, JunctionError};
use crate::junction::messages::{CycleDecision, CycleRequest};
use crate::scheduler::lane::Lane;

const COMMAND_CHANNEL_CAPACITY: usize = 32;

enum ServiceCommand {
    RunCycle {
        request: CycleRequest,
        reply: oneshot::Sender<Result<CycleDecision, JunctionError>>,
    },
    Reset {
        reply: oneshot::Sender<Vec<Lane>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<Lane>>,
    },
}

/// Cloneable async handle to a junction owned by one service task.
///
/// Every call funnels through a single command channel, so however many
/// handles exist, the controller sees cycles one at a time in arrival order.
#[derive(Clone)]
pub struct JunctionHandle {
    commands: mpsc::Sender<ServiceCommand>,
}

impl JunctionHandle {
    /// Runs one scheduling cycle on the owning task.
    pub async fn run_cycle(&self, request: CycleRequest) -> Result<CycleDecision, JunctionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(ServiceCommand::RunCycle { request, reply })
            .await
            .map_err(|_| JunctionError::ServiceClosed)?;
        response.await.map_err(|_| JunctionError::ServiceClosed)?
    }

    /// Clears the junction and returns the post-reset lane snapshot.
    pub async fn reset(&self) -> Result<Vec<Lane>, JunctionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(ServiceCommand::Reset { reply })
            .await
            .map_err(|_| JunctionError::ServiceClosed)?;
        response.await.map_err(|_| JunctionError::ServiceClosed)
    }

    /// Reads the current lane states without scheduling anything.
    pub async fn snapshot(&self) -> Result<Vec<Lane>, JunctionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(ServiceCommand::Snapshot { reply })
            .await
            .map_err(|_| JunctionError::ServiceClosed)?;
        response.await.map_err(|_| JunctionError::ServiceClosed)
    }
}

/// Moves `controller` onto its own task and returns a handle to it.
///
/// The task runs until every handle is dropped; the join handle lets the
/// caller await or abort it.
pub fn start_junction_service(
    controller: JunctionController,
) -> (JunctionHandle, JoinHandle<()>) {
    let (commands, mut inbox) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let task = tokio::spawn(async move {
        let mut controller = controller;
        while let Some(command) = inbox.recv().await {
            match command {
                ServiceCommand::RunCycle { request, reply } => {
                    let _ = reply.send(controller.run_cycle(&request));
                }
                ServiceCommand::Reset { reply } => {
                    let _ = reply.send(controller.reset());
                }
                ServiceCommand::Snapshot { reply } => {
                    let _ = reply.send(controller.lanes().to_vec());
                }
            }
        }
        log::debug!("all junction handles dropped, service stopping");
    });
    (JunctionHandle { commands }, task)
}
