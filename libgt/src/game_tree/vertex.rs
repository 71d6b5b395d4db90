use nfg_lite::game::Player;
use std::fmt::Debug;

/// `SimultaneousGameVertex` is the main trait that should be implemented by the game
/// generator. Each vertex is one stage of the game, at which both players pick an action
/// at the same time without observing the other's choice.
pub trait SimultaneousGameVertex
where
    Self: Debug + Clone,
{
    // Actions which could be taken by either player. Both players may share the same
    // action type, e.g., moves on a grid.
    type Action: Eq + Ord + Debug + Clone;

    /// Actions of `player` at this vertex. Every vertex must offer a player the same
    /// set of actions, since a pure strategy fixes the action of every step in advance.
    fn available_actions(&self, player: Player) -> Box<[Self::Action]>;

    fn next_state(
        &self,
        action_pl1: &Self::Action,
        action_pl2: &Self::Action,
    ) -> VertexOrLeaf<Self>;

    /// Used for sanity checks during traversals. Can possibly panic when we reach an
    /// impossible state. Does nothing by default.
    fn validate(&self) {}
}

/// Indicates if we are at a vertex or a leaf (terminal) vertex.
pub enum VertexOrLeaf<T: SimultaneousGameVertex> {
    Leaf(Leaf),
    Vertex(T),
}

/// Contains details of a terminal state. A game whose leaves are all `Outcome` is
/// stored in the compressed win/loss encoding.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Leaf {
    /// Payoffs of both players. They must sum to zero.
    Payoffs { payoff_pl1: f64, payoff_pl2: f64 },
    /// `true` if Player 1 wins.
    Outcome(bool),
}

impl Leaf {
    pub fn zero_sum(payoff_pl1: f64) -> Leaf {
        Leaf::Payoffs {
            payoff_pl1,
            payoff_pl2: -payoff_pl1,
        }
    }
}
