//! Owned event bus for pipeline notifications.
//!
//! Each viewer creates one bus and shares it as `Arc<EventBus>`. Events fan
//! out three ways: synchronous handlers run on the publishing task, tokio
//! receivers poll a broadcast channel, and the bus itself remembers the
//! newest scene outcome per group so a late subscriber can still render a
//! status line.

use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory, SceneEvent};
use crate::data::Group;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.0.simple().to_string();
        write!(f, "sub-{}", &id[..8])
    }
}

/// Which events a handler wants to see
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventFilter {
    #[default]
    All,
    /// Events of any listed category.
    Categories(Vec<EventCategory>),
    /// Scene events of any listed group. Configuration events never match.
    Groups(Vec<Group>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
            EventFilter::Groups(groups) => event.group().is_some_and(|g| groups.contains(&g)),
        }
    }
}

/// Bus sizing and history retention
#[derive(Debug, Clone, PartialEq)]
pub struct EventBusConfig {
    pub channel_capacity: usize,
    pub enable_history: bool,
    pub max_history_size: usize,
    pub history_retention: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            max_history_size: 500,
            history_retention: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    #[error("No active subscribers")]
    NoSubscribers,
}

type Handler = Box<dyn Fn(&AppEvent) + Send + Sync>;

struct Subscriber {
    filter: EventFilter,
    handler: Handler,
}

#[derive(Default)]
struct Journal {
    recent: VecDeque<(Instant, AppEvent)>,
    latest: BTreeMap<Group, SceneEvent>,
}

impl Journal {
    fn record(&mut self, event: &AppEvent, config: &EventBusConfig) {
        if let AppEvent::Scene(scene) = event {
            self.latest.insert(scene.group(), scene.clone());
        }
        if !config.enable_history {
            return;
        }

        let now = Instant::now();
        self.recent.push_back((now, event.clone()));
        while let Some((at, _)) = self.recent.front() {
            let expired = now.duration_since(*at) > config.history_retention;
            if !expired && self.recent.len() <= config.max_history_size {
                break;
            }
            self.recent.pop_front();
        }
    }
}

pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    subscribers: RwLock<HashMap<SubscriptionId, Subscriber>>,
    journal: Mutex<Journal>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            subscribers: RwLock::new(HashMap::new()),
            journal: Mutex::new(Journal::default()),
            config,
        }
    }

    /// Deliver an event to handlers and receivers
    ///
    /// Returns the number of broadcast receivers reached. Fails only when
    /// neither a handler nor a receiver exists; the event is still
    /// journaled in that case.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        self.journal.lock().record(&event, &self.config);

        let subscribers = self.subscribers.read();
        let mut handled = 0;
        for subscriber in subscribers.values() {
            if subscriber.filter.matches(&event) {
                (subscriber.handler)(&event);
                handled += 1;
            }
        }

        match self.sender.send(event) {
            Ok(receivers) => Ok(receivers),
            Err(_) if subscribers.is_empty() => Err(EventBusError::NoSubscribers),
            Err(_) => {
                tracing::trace!("Event reached {} handlers, no receivers", handled);
                Ok(0)
            }
        }
    }

    /// Register a synchronous handler; it must return quickly
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.write().insert(
            id,
            Subscriber {
                filter,
                handler: Box::new(handler),
            },
        );
        tracing::debug!("Subscription {} added", id);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Newest scene outcome published for `group`, tracked even with history off
    pub fn latest_outcome(&self, group: Group) -> Option<SceneEvent> {
        self.journal.lock().latest.get(&group).cloned()
    }

    /// Retained events, oldest first, optionally only those at or after `since`
    pub fn history(&self, since: Option<Instant>) -> Vec<AppEvent> {
        self.journal
            .lock()
            .recent
            .iter()
            .filter(|(at, _)| since.is_none_or(|since| *at >= since))
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Retained scene events of one group, oldest first
    pub fn history_for(&self, group: Group) -> Vec<SceneEvent> {
        self.journal
            .lock()
            .recent
            .iter()
            .filter_map(|(_, event)| match event {
                AppEvent::Scene(scene) if scene.group() == group => Some(scene.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_history(&self) {
        self.journal.lock().recent.clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("receivers", &self.sender.receiver_count())
            .field("config", &self.config)
            .finish()
    }
}
