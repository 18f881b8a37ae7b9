/// Outgoing transition rule, owned by the workflow whose table holds it.
///
/// Edges are never shared or mutated after creation; composition builds new
/// tables instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Edge {
    /// Unconditional transition to a single target node.
    Simple { target: String },

    /// Discriminant-keyed branches in table order, plus an optional
    /// catch-all taken when no key matches. The catch-all is kept separate
    /// so it always materializes after the explicit keys.
    ControlFlow {
        branches: Vec<(String, String)>,
        default: Option<String>,
    },
}

impl Edge {
    pub fn simple(target: impl Into<String>) -> Self {
        Edge::Simple {
            target: target.into(),
        }
    }
}
