use crate::{CommandId, EntityId, Error};

/// Reference to a configured combo. Without a skeleton name the entity's bound skeleton is used.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComboRef {
    pub skeleton: Option<String>,
    pub combo: String,
}

/// What a command asks for. When both are set the combo wins.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnimationRequest {
    pub animation: Option<String>,
    pub combo: Option<ComboRef>,
}

/// A request reduced to the branch that will be dispatched.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RequestTarget<'a> {
    Animation(&'a str),
    Combo {
        skeleton: Option<&'a str>,
        combo: &'a str,
    },
}

impl AnimationRequest {
    pub fn animation(name: impl Into<String>) -> Self {
        Self {
            animation: Some(name.into()),
            combo: None,
        }
    }

    pub fn combo(skeleton: impl Into<String>, combo: impl Into<String>) -> Self {
        Self {
            animation: None,
            combo: Some(ComboRef {
                skeleton: Some(skeleton.into()),
                combo: combo.into(),
            }),
        }
    }

    /// Combo looked up under whatever skeleton the entity is bound to.
    pub fn bound_combo(combo: impl Into<String>) -> Self {
        Self {
            animation: None,
            combo: Some(ComboRef {
                skeleton: None,
                combo: combo.into(),
            }),
        }
    }

    /// `None` when neither an animation name nor a combo name is present.
    pub fn target(&self) -> Option<RequestTarget<'_>> {
        if let Some(combo) = self.combo.as_ref().filter(|c| !c.combo.is_empty()) {
            return Some(RequestTarget::Combo {
                skeleton: combo.skeleton.as_deref().filter(|s| !s.is_empty()),
                combo: combo.combo.as_str(),
            });
        }
        self.animation
            .as_deref()
            .filter(|a| !a.is_empty())
            .map(RequestTarget::Animation)
    }
}

/// Deferred request to change an entity's animations.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationCommand {
    pub id: CommandId,
    pub entity: EntityId,
    pub request: AnimationRequest,
    processed: bool,
    processed_at: Option<f64>,
}

impl AnimationCommand {
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    /// Engine clock (seconds) at which the command was processed.
    pub fn processed_at(&self) -> Option<f64> {
        self.processed_at
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommandFailure {
    pub command: CommandId,
    pub entity: EntityId,
    pub error: Error,
}

/// Buffer between game logic and animation state.
///
/// Commands are applied in enqueue order once per tick. Each command is processed exactly once;
/// a failing command is still marked processed so it is never retried.
#[derive(Clone, Debug, Default)]
pub struct CommandQueue {
    commands: Vec<AnimationCommand>,
    next_id: u64,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, entity: EntityId, request: AnimationRequest) -> CommandId {
        let id = CommandId(self.next_id);
        self.next_id += 1;
        self.commands.push(AnimationCommand {
            id,
            entity,
            request,
            processed: false,
            processed_at: None,
        });
        id
    }

    pub fn get(&self, id: CommandId) -> Option<&AnimationCommand> {
        self.commands.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnimationCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.commands.iter().filter(|c| !c.processed).count()
    }

    /// Dispatch every unprocessed command. Returns the failures of this batch.
    pub fn process<F>(&mut self, now: f64, mut dispatch: F) -> Vec<CommandFailure>
    where
        F: FnMut(EntityId, RequestTarget<'_>) -> Result<(), Error>,
    {
        let mut failures = Vec::new();
        for command in self.commands.iter_mut().filter(|c| !c.processed) {
            let result = match command.request.target() {
                Some(target) => dispatch(command.entity, target),
                None => Err(Error::InvalidCommand {
                    command: command.id,
                }),
            };
            command.processed = true;
            command.processed_at = Some(now);
            if let Err(error) = result {
                failures.push(CommandFailure {
                    command: command.id,
                    entity: command.entity,
                    error,
                });
            }
        }
        failures
    }

    /// Drop processed commands at least `delay` seconds old. Returns how many were dropped.
    pub fn collect_garbage(&mut self, now: f64, delay: f32) -> usize {
        let before = self.commands.len();
        let delay = f64::from(delay.max(0.0));
        self.commands.retain(|c| match c.processed_at {
            Some(at) if c.processed => now - at < delay,
            _ => true,
        });
        before - self.commands.len()
    }

    pub fn clear_processed(&mut self) -> usize {
        let before = self.commands.len();
        self.commands.retain(|c| !c.processed);
        before - self.commands.len()
    }
}
