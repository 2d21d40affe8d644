use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use audiows_relay::core::leg::{CallLeg, CallLegError, CallLegResult, MediaFrame, Readiness};

/// One scripted call leg event
#[derive(Debug, Clone)]
pub enum LegStep {
    /// A frame is ready and `read_frame` returns it
    Frame(MediaFrame),
    /// The leg reports ready but `read_frame` returns nothing
    ReadNothing,
}

/// Everything the relay did to a [`ScriptedCallLeg`]
#[derive(Debug, Default)]
pub struct LegRecord {
    pub frames_read: usize,
    pub frames_released: usize,
    pub written: Vec<MediaFrame>,
    pub variables: Vec<(String, String)>,
}

impl LegRecord {
    /// Payloads of the written audio frames
    pub fn written_payloads(&self) -> Vec<Vec<u8>> {
        self.written.iter().map(|f| f.payload.to_vec()).collect()
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct ScriptedCallLeg {
    steps: VecDeque<LegStep>,
    /// Once the script is exhausted: `true` waits forever, `false` ends the call
    hold_open: bool,
    /// Writes succeed this many times, then fail
    writes_allowed: Option<usize>,
    record: Arc<Mutex<LegRecord>>,
}

impl ScriptedCallLeg {
    /// Leg that plays `steps` and then hangs up
    pub fn new(steps: impl IntoIterator<Item = LegStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            hold_open: false,
            writes_allowed: None,
            record: Arc::new(Mutex::new(LegRecord::default())),
        }
    }

    /// Leg that plays these frames and then hangs up
    pub fn frames(frames: impl IntoIterator<Item = MediaFrame>) -> Self {
        Self::new(frames.into_iter().map(LegStep::Frame))
    }

    /// Leg with no frames at all
    pub fn empty() -> Self {
        Self::new(Vec::<LegStep>::new())
    }

    /// Keep the call up, silently, once the script runs out
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Fail every write after the first `allowed`
    pub fn fail_writes_after(mut self, allowed: usize) -> Self {
        self.writes_allowed = Some(allowed);
        self
    }

    pub fn record(&self) -> Arc<Mutex<LegRecord>> {
        self.record.clone()
    }
}

#[async_trait]
impl CallLeg for ScriptedCallLeg {
    async fn wait_ready(&mut self) -> Readiness {
        if !self.steps.is_empty() {
            return Readiness::Ready;
        }
        if self.hold_open {
            std::future::pending::<()>().await;
        }
        Readiness::Ended
    }

    async fn read_frame(&mut self) -> Option<MediaFrame> {
        match self.steps.pop_front()? {
            LegStep::Frame(frame) => {
                self.record.lock().frames_read += 1;
                Some(frame)
            }
            LegStep::ReadNothing => None,
        }
    }

    async fn write_frame(&mut self, frame: MediaFrame) -> CallLegResult<()> {
        let mut record = self.record.lock();
        if let Some(allowed) = self.writes_allowed {
            if record.written.len() >= allowed {
                return Err(CallLegError::WriteFailed("scripted write failure".to_string()));
            }
        }
        record.written.push(frame);
        Ok(())
    }

    fn release_frame(&mut self, frame: MediaFrame) {
        self.record.lock().frames_released += 1;
        drop(frame);
    }

    fn set_variable(&mut self, name: &str, value: &str) {
        self.record
            .lock()
            .variables
            .push((name.to_string(), value.to_string()));
    }
}
