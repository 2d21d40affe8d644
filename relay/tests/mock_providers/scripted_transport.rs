use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use audiows_relay::core::transport::{
    BoxedTransport, TransportConnector, TransportError, TransportMessage, TransportResult,
    TransportSession, TransportSettings,
};

/// One scripted `receive` result
#[derive(Debug, Clone)]
pub enum ReceiveStep {
    Message(TransportMessage),
    Error(TransportError),
    /// Sleep before moving to the next step
    Delay(Duration),
}

/// Everything the relay did to a [`ScriptedTransport`]
#[derive(Debug, Default)]
pub struct TransportRecord {
    /// Messages that were sent successfully
    pub sent: Vec<TransportMessage>,
    pub send_attempts: usize,
    pub receive_calls: usize,
    pub close_count: usize,
}

impl TransportRecord {
    pub fn sent_payloads(&self) -> Vec<Vec<u8>> {
        self.sent.iter().map(|m| m.payload.to_vec()).collect()
    }
}

/// How [`ScriptedTransport::send`] behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendBehavior {
    Succeed,
    Fail,
    /// Never completes, like a peer that stopped reading
    Stall,
}

/// Transport that replays receive results. An exhausted script waits forever.
pub struct ScriptedTransport {
    steps: VecDeque<ReceiveStep>,
    sends: SendBehavior,
    record: Arc<Mutex<TransportRecord>>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = ReceiveStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            sends: SendBehavior::Succeed,
            record: Arc::new(Mutex::new(TransportRecord::default())),
        }
    }

    /// Transport whose receives yield these messages in order
    pub fn messages(messages: impl IntoIterator<Item = TransportMessage>) -> Self {
        Self::new(messages.into_iter().map(ReceiveStep::Message))
    }

    /// Transport that never receives anything
    pub fn idle() -> Self {
        Self::new(Vec::<ReceiveStep>::new())
    }

    /// Make every send fail
    pub fn failing_sends(mut self) -> Self {
        self.sends = SendBehavior::Fail;
        self
    }

    /// Make every send hang after being counted as an attempt
    pub fn stalled_sends(mut self) -> Self {
        self.sends = SendBehavior::Stall;
        self
    }

    pub fn record(&self) -> Arc<Mutex<TransportRecord>> {
        self.record.clone()
    }
}

#[async_trait]
impl TransportSession for ScriptedTransport {
    async fn send(&mut self, message: TransportMessage) -> TransportResult<()> {
        {
            let mut record = self.record.lock();
            record.send_attempts += 1;
            match self.sends {
                SendBehavior::Succeed => {
                    record.sent.push(message);
                    return Ok(());
                }
                SendBehavior::Fail => {
                    return Err(TransportError::Send("scripted send failure".to_string()));
                }
                SendBehavior::Stall => {}
            }
        }
        std::future::pending().await
    }

    async fn receive(&mut self) -> TransportResult<TransportMessage> {
        self.record.lock().receive_calls += 1;
        loop {
            // Steps are only popped once complete, so a cancelled receive
            // loses nothing.
            match self.steps.front().cloned() {
                Some(ReceiveStep::Delay(duration)) => {
                    tokio::time::sleep(duration).await;
                    self.steps.pop_front();
                }
                Some(ReceiveStep::Message(message)) => {
                    self.steps.pop_front();
                    return Ok(message);
                }
                Some(ReceiveStep::Error(error)) => {
                    self.steps.pop_front();
                    return Err(error);
                }
                None => std::future::pending::<()>().await,
            }
        }
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.record.lock().close_count += 1;
        Ok(())
    }
}

/// Connector handing out one prepared [`ScriptedTransport`], then failing.
pub struct ScriptedConnector {
    transport: Mutex<Option<ScriptedTransport>>,
    pub requested: Mutex<Vec<TransportSettings>>,
}

impl ScriptedConnector {
    pub fn new(transport: ScriptedTransport) -> Self {
        Self {
            transport: Mutex::new(Some(transport)),
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TransportConnector for ScriptedConnector {
    async fn connect(&self, settings: &TransportSettings) -> TransportResult<BoxedTransport> {
        self.requested.lock().push(settings.clone());
        match self.transport.lock().take() {
            Some(transport) => Ok(Box::new(transport)),
            None => Err(TransportError::ConnectionFailed(
                "scripted connector exhausted".to_string(),
            )),
        }
    }
}
