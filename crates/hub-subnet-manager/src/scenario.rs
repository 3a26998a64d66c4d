//! Scripted move sequences
//!
//! A [`Scenario`] fixes the router and target universes and lists the
//! moves to apply in order. Scenarios are plain TOML:
//!
//! ```toml
//! routers = [3, 5, 7, 9]
//! targets = [1, 2, 3, 4]
//!
//! [manager]
//! hub_offset = 1
//!
//! [[steps]]
//! action = "move_targets"
//! targets = [1, 3]
//! subnet = 2
//!
//! [[steps]]
//! action = "move_routers"
//! routers = [9]
//! # no subnet: detach
//! ```

use crate::events::{EventSink, FanoutSink, InMemorySink, SubnetEvent};
use crate::models::{NetworkSnapshot, RouterId, SubnetId, TargetId};
use crate::service::{MoveSummary, SubnetManager, SubnetManagerConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Scenario errors
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize scenario: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to build network")]
    Setup(#[source] crate::Error),

    #[error("Step {index} failed: {step}")]
    Step {
        index: usize,
        step: Step,
        #[source]
        source: crate::Error,
    },
}

/// One scripted move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    MoveTargets {
        targets: Vec<TargetId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subnet: Option<SubnetId>,
    },
    MoveRouters {
        routers: Vec<RouterId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subnet: Option<SubnetId>,
    },
}

impl Step {
    pub fn move_targets(targets: &[u64], subnet: Option<u64>) -> Self {
        Step::MoveTargets {
            targets: targets.iter().copied().map(TargetId::new).collect(),
            subnet: subnet.map(SubnetId::new),
        }
    }

    pub fn move_routers(routers: &[u64], subnet: Option<u64>) -> Self {
        Step::MoveRouters {
            routers: routers.iter().copied().map(RouterId::new).collect(),
            subnet: subnet.map(SubnetId::new),
        }
    }

    fn apply(&self, manager: &mut SubnetManager) -> crate::Result<MoveSummary> {
        match self {
            Step::MoveTargets { targets, subnet } => {
                manager.move_targets(targets.iter().copied(), *subnet)
            }
            Step::MoveRouters { routers, subnet } => {
                manager.move_routers(routers.iter().copied(), *subnet)
            }
        }
    }
}

fn list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (what, ids, subnet) = match self {
            Step::MoveTargets { targets, subnet } => ("TARGETS", list(targets), subnet),
            Step::MoveRouters { routers, subnet } => ("ROUTERS", list(routers), subnet),
        };
        match subnet {
            Some(subnet) => write!(f, "MOVING {what} [{ids}] TO SUBNET {subnet}"),
            None => write!(f, "MOVING {what} [{ids}] OUT OF ALL SUBNETS"),
        }
    }
}

/// Outcome of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: Step,
    pub summary: MoveSummary,
    pub events: Vec<SubnetEvent>,
    pub snapshot: NetworkSnapshot,
}

/// Outcome of a whole scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub initial: NetworkSnapshot,
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    /// Every event of the run, in emission order
    pub fn events(&self) -> impl Iterator<Item = &SubnetEvent> {
        self.steps.iter().flat_map(|step| step.events.iter())
    }

    /// Membership after the last step
    pub fn final_snapshot(&self) -> &NetworkSnapshot {
        self.steps
            .last()
            .map(|step| &step.snapshot)
            .unwrap_or(&self.initial)
    }
}

/// Router/target universes plus an ordered list of moves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub routers: Vec<RouterId>,
    #[serde(default)]
    pub targets: Vec<TargetId>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub manager: SubnetManagerConfig,
}

impl Scenario {
    /// Four self-hosting routers, four loose targets and nine moves that
    /// exercise merges, hub departures, activation and teardown.
    pub fn reference() -> Self {
        Self {
            routers: [3, 5, 7, 9].into_iter().map(RouterId::new).collect(),
            targets: [1, 2, 3, 4].into_iter().map(TargetId::new).collect(),
            steps: vec![
                Step::move_targets(&[1, 3], Some(2)),
                Step::move_targets(&[2, 4], Some(4)),
                Step::move_routers(&[5, 7], Some(2)),
                Step::move_targets(&[2, 3, 4], Some(8)),
                Step::move_routers(&[3], Some(8)),
                Step::move_routers(&[7], Some(8)),
                Step::move_routers(&[9], Some(4)),
                Step::move_routers(&[5, 7], Some(6)),
                Step::move_routers(&[5, 9], Some(6)),
            ],
            manager: SubnetManagerConfig::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ScenarioError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build a fresh manager for this scenario's universes
    pub fn build_manager(&self, sink: Arc<dyn EventSink>) -> crate::Result<SubnetManager> {
        SubnetManager::builder()
            .config(self.manager.clone())
            .routers(self.routers.iter().copied())
            .targets(self.targets.iter().copied())
            .sink(sink)
            .build()
    }

    pub fn run(&self) -> Result<ScenarioReport, ScenarioError> {
        self.run_with_sink(None)
    }

    /// Run every step, additionally forwarding events to `sink`.
    ///
    /// Stops at the first failing step.
    pub fn run_with_sink(
        &self,
        sink: Option<Arc<dyn EventSink>>,
    ) -> Result<ScenarioReport, ScenarioError> {
        let recorder = Arc::new(InMemorySink::new());
        let mut fanout = FanoutSink::new().with_sink(recorder.clone());
        if let Some(sink) = sink {
            fanout = fanout.with_sink(sink);
        }

        let mut manager = self
            .build_manager(Arc::new(fanout))
            .map_err(ScenarioError::Setup)?;
        let initial = manager.snapshot();

        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            tracing::info!(index, "{}", step);

            let summary = step
                .apply(&mut manager)
                .map_err(|source| ScenarioError::Step {
                    index,
                    step: step.clone(),
                    source,
                })?;

            steps.push(StepReport {
                index,
                step: step.clone(),
                summary,
                events: recorder.take(),
                snapshot: manager.snapshot(),
            });
        }

        Ok(ScenarioReport { initial, steps })
    }
}
