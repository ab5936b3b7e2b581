use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use modlink_engine::{Delivery, Dispatcher, Module, ModuleCore, ModuleId};
use modlink_events::{EventKind, EventPtr, EventVariant, HandlerRegistry, RegistryConfig};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ChatMessage {
    author: String,
    text: String,
}

impl EventVariant for ChatMessage {
    const KIND: EventKind = 1;

    fn render(&self) -> String {
        format!("ChatMessage from {}: {}", self.author, self.text)
    }
}

#[derive(Debug)]
struct Alert {
    message: String,
    code: i32,
}

impl EventVariant for Alert {
    const KIND: EventKind = 2;

    fn render(&self) -> String {
        format!("Alert: {} (code: {})", self.message, self.code)
    }
}

// ---------------------------------------------------------------------------
// Queue dispatcher: accepts now, delivers when the loop drains it
// ---------------------------------------------------------------------------

#[derive(Default)]
struct QueueDispatcher {
    queue: Mutex<VecDeque<Delivery>>,
}

impl QueueDispatcher {
    fn pop(&self) -> Option<Delivery> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

impl Dispatcher for QueueDispatcher {
    fn deliver(&self, event: EventPtr, from: ModuleId) -> bool {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Delivery { from, event });
        true
    }
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

/// Keeps a transcript of chat messages from other modules.
struct ChatModule {
    core: ModuleCore,
    transcript: Arc<Mutex<Vec<String>>>,
}

impl ChatModule {
    fn new(id: ModuleId, registry: HandlerRegistry, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            core: ModuleCore::with_registry(id, "chat", registry, dispatcher),
            transcript: Arc::default(),
        }
    }

    fn say(&self, text: &str) -> bool {
        self.send(Arc::new(ChatMessage {
            author: self.name().to_string(),
            text: text.to_string(),
        }))
    }
}

impl Module for ChatModule {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn init_subscribes(&mut self) {
        let transcript = Arc::clone(&self.transcript);
        self.subscribe::<ChatMessage, _>(move |msg| {
            transcript
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(format!("{}: {}", msg.author, msg.text));
        });
    }
}

/// Counts alerts and echoes every chat message it sees.
struct AuditModule {
    core: ModuleCore,
    alerts: Arc<Mutex<Vec<i32>>>,
}

impl AuditModule {
    fn new(id: ModuleId, registry: HandlerRegistry, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            core: ModuleCore::with_registry(id, "audit", registry, dispatcher),
            alerts: Arc::default(),
        }
    }

    fn raise(&self, message: &str, code: i32) -> bool {
        self.send(Arc::new(Alert {
            message: message.to_string(),
            code,
        }))
    }
}

impl Module for AuditModule {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn init_subscribes(&mut self) {
        let alerts = Arc::clone(&self.alerts);
        self.subscribe::<Alert, _>(move |alert| {
            alerts
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(alert.code);
        });
        self.subscribe::<ChatMessage, _>(|msg| {
            info!(author = %msg.author, "Audited chat message");
        });
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("modlink=info".parse()?))
        .init();

    info!("modlink demo starting...");

    let config = RegistryConfig::from_env();
    config.log();

    let dispatcher = Arc::new(QueueDispatcher::default());
    let mut chat = ChatModule::new(1, HandlerRegistry::with_config(config), dispatcher.clone());
    let mut audit = AuditModule::new(2, HandlerRegistry::with_config(config), dispatcher.clone());
    chat.init_subscribes();
    audit.init_subscribes();

    chat.say("Hello");
    audit.raise("disk almost full", 507);
    audit.send(Arc::new(ChatMessage {
        author: "audit".into(),
        text: "all systems nominal".into(),
    }));

    let mut modules: [&mut dyn Module; 2] = [&mut chat, &mut audit];
    let mut unhandled = 0usize;
    while let Some(Delivery { from, event }) = dispatcher.pop() {
        for module in modules.iter_mut().filter(|m| m.id() != from) {
            if module.process_event(&event)? {
                info!(to = module.name(), event = %event.render(), "Delivered");
            } else {
                unhandled += 1;
                warn!(to = module.name(), kind = event.kind(), "No subscriber");
            }
        }
    }

    let transcript = chat.transcript.lock().unwrap_or_else(PoisonError::into_inner);
    let alerts = audit.alerts.lock().unwrap_or_else(PoisonError::into_inner);

    println!("\n=== modlink demo ===");
    println!("Transcript: {:?}", *transcript);
    println!("Alerts: {:?}  |  Unhandled deliveries: {unhandled}", *alerts);

    Ok(())
}
