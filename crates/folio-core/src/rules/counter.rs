//! Statistic counters that count up once they scroll into view.
//!
//! Each label animates from `0+` to its target over the configured duration
//! on a repeating scheduler task. The task is cancelled on the tick that
//! reaches the target.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::CounterConfig;
use crate::dom::{Document, NodeId};
use crate::error::{FolioError, FolioResult};
use crate::observer::{Geometry, VisibilityObserver};
use crate::scheduler::{Firing, Scheduler, TaskId};

/// Integer target of a label such as `"1200+ clients"`. Non-digits are
/// ignored; `None` when there are no digits or the number overflows.
pub fn parse_target(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterFrame {
    Running(u64),
    Finished(u64),
}

impl CounterFrame {
    pub fn value(&self) -> u64 {
        match self {
            CounterFrame::Running(v) | CounterFrame::Finished(v) => *v,
        }
    }
}

/// Progress of a single counter, in whole ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterAnimation {
    target: u64,
    steps: u64,
    step: u64,
}

impl CounterAnimation {
    pub fn new(target: u64, config: &CounterConfig) -> Self {
        Self {
            target,
            steps: (config.duration_ms / config.tick_ms.max(1)).max(1),
            step: 0,
        }
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Advance one tick
    pub fn tick(&mut self) -> CounterFrame {
        self.step = (self.step + 1).min(self.steps);
        if self.step == self.steps {
            return CounterFrame::Finished(self.target);
        }
        let value = (self.target as u128 * self.step as u128 / self.steps as u128) as u64;
        CounterFrame::Running(value)
    }
}

#[derive(Debug)]
pub struct StatCounters {
    observer: VisibilityObserver,
    running: HashMap<TaskId, (NodeId, CounterAnimation)>,
    config: CounterConfig,
}

impl StatCounters {
    pub fn bind<D: Document>(doc: &D, config: &CounterConfig) -> FolioResult<Self> {
        let labels = doc.query_all(&config.labels);
        if labels.is_empty() {
            return Err(FolioError::missing(config.labels.to_string()));
        }
        let mut observer = VisibilityObserver::new(config.observer_options());
        for label in labels {
            observer.observe(label);
        }
        Ok(Self {
            observer,
            running: HashMap::new(),
            config: config.clone(),
        })
    }

    /// Counters with a live timer
    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    pub fn is_watching(&self, node: NodeId) -> bool {
        self.observer.is_observing(node)
    }

    /// Start the counter for `target` if this observation puts it in view.
    /// Returns the timer started, if any.
    pub fn on_visible<D: Document>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<NodeId>,
        target: NodeId,
        geometry: &Geometry,
    ) -> Option<TaskId> {
        if !self.observer.triggers(target, geometry) {
            return None;
        }
        self.observer.unobserve(target);

        let goal = parse_target(&doc.text(target)).filter(|g| *g > 0);
        doc.set_text(target, &self.label(0));
        let Some(goal) = goal else {
            debug!(%target, "Counter has no positive target, showing zero");
            return None;
        };

        let task = scheduler.schedule_every(self.config.tick(), target);
        self.running.insert(task, (target, CounterAnimation::new(goal, &self.config)));
        info!(%target, goal, ?task, "Counter started");
        Some(task)
    }

    /// Handle a timer firing. Firings for unknown tasks are ignored.
    pub fn on_tick<D: Document>(
        &mut self,
        doc: &mut D,
        scheduler: &mut Scheduler<NodeId>,
        firing: &Firing<NodeId>,
    ) {
        let Some((node, animation)) = self.running.get_mut(&firing.id) else {
            return;
        };
        let node = *node;
        let frame = animation.tick();
        doc.set_text(node, &self.label(frame.value()));
        match frame {
            CounterFrame::Running(_) => {}
            CounterFrame::Finished(value) => {
                if scheduler.cancel(firing.id) {
                    debug!(%node, value, task = ?firing.id, "Counter finished, timer stopped");
                }
                self.running.remove(&firing.id);
            }
        }
    }

    fn label(&self, value: u64) -> String {
        format!("{}{}", value, self.config.suffix)
    }
}
