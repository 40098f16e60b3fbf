//! Post-processing of found paths.

use crate::path::GridPath;

/// A transformation of a found path applied before the path is handed to
/// its consumer.
pub trait PathModifier {
    fn apply(&self, path: GridPath) -> GridPath;
}

/// Ordered list of modifiers. Each modifier receives the output of the
/// previous one.
#[derive(Default)]
pub struct ModifierChain {
    modifiers: Vec<Box<dyn PathModifier + Send + Sync>>,
}

impl ModifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a modifier to the end of the chain.
    pub fn push<M>(&mut self, modifier: M)
    where
        M: PathModifier + Send + Sync + 'static,
    {
        self.modifiers.push(Box::new(modifier));
    }

    /// Returns the chain with a modifier appended to its end.
    pub fn with<M>(mut self, modifier: M) -> Self
    where
        M: PathModifier + Send + Sync + 'static,
    {
        self.push(modifier);
        self
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}

impl PathModifier for ModifierChain {
    fn apply(&self, path: GridPath) -> GridPath {
        self.modifiers
            .iter()
            .fold(path, |path, modifier| modifier.apply(path))
    }
}

/// Path smoothing extension point. The path is currently returned
/// unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct BezierModifier;

impl PathModifier for BezierModifier {
    fn apply(&self, path: GridPath) -> GridPath {
        path
    }
}

/// Path shortcutting extension point. The path is currently returned
/// unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct TunnelModifier;

impl PathModifier for TunnelModifier {
    fn apply(&self, path: GridPath) -> GridPath {
        path
    }
}
