//! Tabular Q-learning agent
//!
//! The agent keeps one value estimate per (state key, action). The table is
//! the agent's learned knowledge: it grows with every new state key the agent
//! visits, is never pruned, and survives [`Participant::reset`] so learning
//! carries across matches.

use rand::{Rng, RngCore};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{check_step, check_unit, ArenaError};
use crate::participant::{Capabilities, Observation, Participant, Transition};
use crate::rules::Action;
use crate::state::StateKey;

/// Estimated return of each action, indexed by [`Action::index`]
pub type ActionValues = [f64; 2];

/// Learning parameters for [`QAgent`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    /// Learning rate α, in (0, 1]
    pub alpha: f64,
    /// Discount factor γ, in [0, 1]
    pub gamma: f64,
    /// Exploration rate ε, in [0, 1]
    pub epsilon: f64,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.1,
        }
    }
}

impl AgentParams {
    pub fn validate(&self) -> Result<(), ArenaError> {
        check_step("alpha", self.alpha)?;
        check_unit("gamma", self.gamma)?;
        check_unit("epsilon", self.epsilon)
    }
}

/// State key -> action values, initialised lazily to zero
#[derive(Clone, Debug, Default)]
pub struct ValueTable {
    values: FxHashMap<StateKey, ActionValues>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values for `state`, inserting `[0.0, 0.0]` on first reference.
    pub fn get_or_insert(&mut self, state: &StateKey) -> &mut ActionValues {
        self.values.entry(state.clone()).or_insert([0.0; 2])
    }

    /// Values for `state` without touching the table
    pub fn get(&self, state: &StateKey) -> Option<&ActionValues> {
        self.values.get(state)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.values.iter()
    }

    /// The greedy action for every visited state, sorted by state key
    pub fn greedy_policy(&self) -> Vec<(StateKey, Action)> {
        let mut policy: Vec<_> = self
            .values
            .iter()
            .map(|(state, values)| (state.clone(), greedy(values)))
            .collect();
        policy.sort();
        policy
    }
}

/// Highest-valued action; ties go to cooperation.
pub fn greedy(values: &ActionValues) -> Action {
    if values[Action::Cooperate.index()] >= values[Action::Cheat.index()] {
        Action::Cooperate
    } else {
        Action::Cheat
    }
}

/// ε-greedy tabular Q-learner
#[derive(Clone, Debug)]
pub struct QAgent {
    name: String,
    params: AgentParams,
    table: ValueTable,
    last_state: Option<StateKey>,
    last_action: Option<Action>,
}

impl QAgent {
    pub fn new(name: impl Into<String>, params: AgentParams) -> Result<Self, ArenaError> {
        params.validate()?;
        Ok(Self {
            name: name.into(),
            params,
            table: ValueTable::new(),
            last_state: None,
            last_action: None,
        })
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ValueTable {
        &mut self.table
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Change exploration, e.g. when switching from training to evaluation.
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<(), ArenaError> {
        check_unit("epsilon", epsilon)?;
        self.params.epsilon = epsilon;
        Ok(())
    }

    /// Last state decided on in the current match
    pub fn last_state(&self) -> Option<&StateKey> {
        self.last_state.as_ref()
    }

    /// Last action chosen in the current match
    pub fn last_action(&self) -> Option<Action> {
        self.last_action
    }

    /// ε-greedy choice for `state`
    pub fn choose(&mut self, state: &StateKey, rng: &mut dyn RngCore) -> Action {
        let action = if rng.gen::<f64>() < self.params.epsilon {
            Action::ALL[rng.gen_range(0..Action::ALL.len())]
        } else {
            greedy(self.table.get_or_insert(state))
        };
        self.last_state = Some(state.clone());
        self.last_action = Some(action);
        action
    }

    /// One-step Q-learning update:
    /// `Q[s][a] += α · (r + γ · max Q[s'] − Q[s][a])`
    pub fn update(&mut self, state: &StateKey, action: Action, reward: f64, next_state: &StateKey) {
        let before = self.table.len();
        let next_max = {
            let next = self.table.get_or_insert(next_state);
            next[0].max(next[1])
        };
        let AgentParams { alpha, gamma, .. } = self.params;
        let q = &mut self.table.get_or_insert(state)[action.index()];
        *q += alpha * (reward + gamma * next_max - *q);
        if self.table.len() > before {
            log::debug!("{} value table grew to {} states", self.name, self.table.len());
        }
    }
}

impl Participant for QAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::LEARNER
    }

    /// The engine always shows a learner its state key. A caller driving the
    /// agent by hand with raw histories gets the opening move, and nothing is
    /// recorded or learned from that round.
    fn decide(&mut self, observation: &Observation<'_>, rng: &mut dyn RngCore) -> Action {
        match observation.state() {
            Some(state) => self.choose(state, rng),
            None => {
                log::warn!("{} was shown histories instead of a state key", self.name);
                self.last_state = None;
                self.last_action = None;
                Action::Cooperate
            }
        }
    }

    fn learn(&mut self, t: &Transition<'_>) {
        self.update(t.state, t.action, f64::from(t.reward), t.next_state);
    }

    fn reset(&mut self) {
        self.last_state = None;
        self.last_action = None;
    }
}
