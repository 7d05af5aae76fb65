//! Anchor candidates for deferred space-switch wiring
//!
//! Modules surface controls that downstream space-switch constraint
//! building may retarget. The registry is an append-only log scoped to one
//! rig-build session; de-duplication, if any, belongs to the consumer.

/// How a generated space switch follows its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchMode {
    /// Full parent constraint
    Parent,
    /// Rotation only
    Orient,
    /// Translation only
    Point,
}

/// One candidate target for a deferred space switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorCandidate {
    /// Control the switch would target
    pub control: String,
    pub mode: SwitchMode,
    /// Priority among candidates for the same switch
    pub weight: i32,
    /// Controls to exclude from the generated switch
    pub exceptions: Vec<String>,
}

/// Append-only log of anchor candidates, insertion order preserved
#[derive(Debug, Clone, Default)]
pub struct AnchorRegistry {
    candidates: Vec<AnchorCandidate>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, candidate: AnchorCandidate) {
        self.candidates.push(candidate);
    }

    /// All candidates in insertion order, duplicates allowed
    pub fn all(&self) -> &[AnchorCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(control: &str, weight: i32) -> AnchorCandidate {
        AnchorCandidate {
            control: control.into(),
            mode: SwitchMode::Parent,
            weight,
            exceptions: Vec::new(),
        }
    }

    #[test]
    fn preserves_insertion_order() {
        let mut registry = AnchorRegistry::new();
        registry.register(candidate("world_ctl", 0));
        registry.register(candidate("chest_ctl", 2));
        registry.register(candidate("head_ctl", 1));

        let names: Vec<&str> = registry.all().iter().map(|c| c.control.as_str()).collect();
        assert_eq!(names, vec!["world_ctl", "chest_ctl", "head_ctl"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut registry = AnchorRegistry::new();
        registry.register(candidate("world_ctl", 0));
        registry.register(candidate("world_ctl", 0));
        assert_eq!(registry.len(), 2);
    }
}
