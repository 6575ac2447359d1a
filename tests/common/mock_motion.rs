//! Mock Motion Backend for Testing

use aivoicy::error::{BotResult, VoiceBotError};
use aivoicy::robot::{MotionBackend, MotionIntent};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Records executed motions
pub struct MockMotion {
    pub executed: Mutex<Vec<MotionIntent>>,
    pub present: AtomicBool,
    pub should_fail: AtomicBool,
}

impl MockMotion {
    pub fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            present: AtomicBool::new(true),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn executed(&self) -> Vec<MotionIntent> {
        self.executed.lock().unwrap().clone()
    }

    fn run(&self, intent: MotionIntent) -> BotResult<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(VoiceBotError::Http {
                status: 503,
                body: "motor fault".into(),
            });
        }
        self.executed.lock().unwrap().push(intent);
        Ok(())
    }
}

impl Default for MockMotion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MotionBackend for MockMotion {
    async fn probe(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    async fn move_forward(&self) -> BotResult<()> {
        self.run(MotionIntent::Forward)
    }

    async fn stop(&self) -> BotResult<()> {
        self.run(MotionIntent::Stop)
    }

    async fn turn_left(&self) -> BotResult<()> {
        self.run(MotionIntent::Left)
    }

    async fn turn_right(&self) -> BotResult<()> {
        self.run(MotionIntent::Right)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
