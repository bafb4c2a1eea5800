use crate::call_control::{CallActions, ControlError};
use crate::commands::Command;
use crate::messaging::Notifier;
use std::sync::{Arc, Mutex, OnceLock};
use uuid::Uuid;

/// Call-scoped identifiers, fixed for the process lifetime.
#[derive(Debug)]
pub struct Session {
    meeting_id: String,
    call_sid: OnceLock<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            meeting_id: Uuid::new_v4().to_string(),
            call_sid: OnceLock::new(),
        }
    }

    pub fn meeting_id(&self) -> &str {
        &self.meeting_id
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct WorkflowState {
    last_response: Option<String>,
    join_requested: bool,
}

/// Orchestrates the boss workflows: relaying questions, repeating the last
/// reply, and the ask-to-join / approve-or-decline loop.
///
/// State mutations happen in a single read-modify-write under the lock; the
/// lock is never held across an await. All outbound actions (whisper, SMS,
/// boss dial) are fire-and-forget: spawned, logged, never retried.
pub struct Workflow {
    session: Session,
    state: Mutex<WorkflowState>,
    calls: Arc<dyn CallActions>,
    notifier: Arc<dyn Notifier>,
    boss_name: String,
    boss_phone: String,
}

impl Workflow {
    pub fn new(
        session: Session,
        calls: Arc<dyn CallActions>,
        notifier: Arc<dyn Notifier>,
        boss_name: String,
        boss_phone: String,
    ) -> Self {
        Self {
            session,
            state: Mutex::new(WorkflowState::default()),
            calls,
            notifier,
            boss_name,
            boss_phone,
        }
    }

    pub fn meeting_id(&self) -> &str {
        self.session.meeting_id()
    }

    pub fn boss_name(&self) -> &str {
        &self.boss_name
    }

    pub fn call_sid(&self) -> Option<&str> {
        self.session.call_sid.get().map(String::as_str)
    }

    pub fn join_requested(&self) -> bool {
        self.state.lock().unwrap().join_requested
    }

    pub fn last_response(&self) -> Option<String> {
        self.state.lock().unwrap().last_response.clone()
    }

    /// Place the primary call into the conference bridge and remember its
    /// sid. The system's entry action, taken as soon as the analytics
    /// connection is up; failure here is fatal to startup.
    pub async fn dial_primary(&self) -> Result<(), ControlError> {
        let sid = self.calls.place_call(false).await?;
        log::info!("successfully created new call with callSid: {}", sid);
        let _ = self.session.call_sid.set(sid);
        Ok(())
    }

    /// Whisper text into the active call. Fire-and-forget: logs the outcome,
    /// does not block the caller.
    pub fn speak(&self, text: String) {
        let Some(sid) = self.session.call_sid.get() else {
            log::warn!("no active call yet, dropping whisper: {}", text);
            return;
        };
        let sid = sid.clone();
        let calls = Arc::clone(&self.calls);
        tokio::spawn(async move {
            if let Err(e) = calls.whisper(&sid, &text).await {
                log::warn!("Failed to perform live call control: {}", e);
            }
        });
    }

    /// Text the boss. Fire-and-forget like [`Workflow::speak`].
    fn notify_boss(&self, text: String) {
        let to = self.boss_phone.clone();
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.send_sms(&to, &text).await {
                log::warn!("Failed to send SMS: {}", e);
            }
        });
    }

    /// Affirm the question we are going to relay, then send it via SMS.
    pub fn question(&self, question: &str) {
        self.speak(format!(
            "Sure, I will ask {}: {}",
            self.boss_name, question
        ));
        self.notify_boss(format!("Hey Boss, the folks asked: {}", question));
    }

    /// Repeat the boss's last reply into the call.
    pub fn repeat(&self) {
        let last = self.last_response();
        let text = match last {
            Some(reply) => format!("Sure.  {} said: {}", self.boss_name, reply),
            None => format!("{} hasn't said anything yet", self.boss_name),
        };
        self.speak(text);
    }

    /// Start the ask-to-join flow: mark the pending request, acknowledge it
    /// on the call, and text the boss the reply instructions.
    pub fn join_boss(&self) {
        self.state.lock().unwrap().join_requested = true;
        self.speak(format!(
            "Sure, I will check to see if {} can join the call",
            self.boss_name
        ));
        self.notify_boss(
            "Hey Boss, the folks asked if you could join.\n\
             Text Y to join or N to decline.\n\n\
             You can also text a longer reason why you can't join and I'll announce it to the folks"
                .to_string(),
        );
    }

    /// Asynchronous completion path: an inbound SMS reply from the boss.
    ///
    /// While a join request is pending the reply is a join decision and does
    /// not become the "last response"; otherwise it is stored and announced.
    /// The Y/N comparison is exact on purpose (matches the upstream
    /// platform's documented behavior; see DESIGN.md).
    pub fn handle_reply(&self, text: &str) {
        let was_join_decision = {
            let mut state = self.state.lock().unwrap();
            if state.join_requested {
                state.join_requested = false;
                true
            } else {
                state.last_response = Some(text.to_string());
                false
            }
        };

        if !was_join_decision {
            self.speak(format!("So {} said: {}", self.boss_name, text));
            return;
        }

        match text {
            "N" => self.speak(format!(
                "Sorry, {} can't join the call right now",
                self.boss_name
            )),
            "Y" => {
                self.speak(format!(
                    "OK, I am connecting {} to the call now",
                    self.boss_name
                ));
                self.place_boss_call();
            }
            reason => self.speak(format!(
                "So {} can't join the call right now.  He said: {}",
                self.boss_name, reason
            )),
        }
    }

    /// Map a recognized voice command onto its workflow.
    pub fn dispatch(&self, command: Command) {
        match command {
            Command::JoinBoss => self.join_boss(),
            Command::Question(question) => self.question(&question),
            Command::Repeat => self.repeat(),
        }
    }

    fn place_boss_call(&self) {
        let calls = Arc::clone(&self.calls);
        tokio::spawn(async move {
            match calls.place_call(true).await {
                Ok(sid) => {
                    log::info!("successfully created new call for boss with callSid: {}", sid)
                }
                Err(e) => log::warn!("Failed to connect boss to conference bridge: {}", e),
            }
        });
    }
}
