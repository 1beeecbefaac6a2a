//! Event logging for simulation replay and auditing.
//!
//! The trading core does not persist anything itself; it appends
//! timestamped records to an in-memory log that an external recorder
//! drains. The only records the core emits are cycle-window events:
//! {agent, time, window type, length}.

use serde::{Deserialize, Serialize};

/// Kind of scheduling window a buy policy entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowKind {
    /// Sampled active period
    Active,
    /// Sampled dormant period
    Dormant,
    /// Active period bounded by received mass, not a sampled length
    CumulativeCap,
}

impl WindowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Active => "Active",
            WindowKind::Dormant => "Dormant",
            WindowKind::CumulativeCap => "CumulativeCap",
        }
    }
}

/// Simulation event capturing a state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A buy policy scheduled an active/dormant/cumulative-cap window
    CycleWindow {
        time: i64,
        agent_id: String,
        policy: String,
        window: WindowKind,
        length: i64,
    },
}

impl Event {
    /// Simulated time the event refers to
    pub fn time(&self) -> i64 {
        match self {
            Event::CycleWindow { time, .. } => *time,
        }
    }

    /// Agent the event belongs to
    pub fn agent_id(&self) -> &str {
        match self {
            Event::CycleWindow { agent_id, .. } => agent_id,
        }
    }
}

/// In-memory event log with query helpers.
///
/// # Example
/// ```
/// use resource_exchange_core_rs::models::{Event, EventLog, WindowKind};
///
/// let mut log = EventLog::new();
/// log.log(Event::CycleWindow {
///     time: 3,
///     agent_id: "reactor-1".to_string(),
///     policy: "fuel_buy".to_string(),
///     window: WindowKind::Dormant,
///     length: 5,
/// });
/// assert_eq!(log.events_for_agent("reactor-1").len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_at_time(&self, time: i64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.time() == time).collect()
    }

    pub fn events_for_agent(&self, agent_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.agent_id() == agent_id)
            .collect()
    }

    pub fn windows_of_kind(&self, kind: WindowKind) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::CycleWindow { window, .. } if *window == kind))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Serialize the whole log for the external recorder
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events)
    }
}
