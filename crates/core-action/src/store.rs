//! Arena of actions, indexed by the same [`StubId`] a `Cell::action`
//! carries as its payload (spec.md §3 "Actions own their Details."),
//! following the same "id already embedded in a cell payload, registry
//! owned one layer up" idiom as `core_level::ArrayStore` and
//! `core_bind::BindStore`.

use std::collections::HashMap;

use core_bind::ContextId;
use core_stub::StubId;

use crate::details::Details;
use crate::param::ParamList;

pub type ActionId = StubId;

/// Built-in operations a `Native` dispatcher performs. A real interpreter
/// stores an opaque C function pointer here; this rewrite closes the set
/// to what the supplemental host module (spec.md §4.O) actually needs,
/// documented in DESIGN.md as the natives-as-enum simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    LessThan,
    Print,
    Yield,
    /// `func spec body`: builds a new `Func` action from a spec block (read
    /// for its WORD! cells only — refinements/types are a parser concern
    /// out of scope here) and a body block.
    Func,
    /// `change series value`: replaces one element at the series' own
    /// cursor (`Payload::Series`'s index) with `value`.
    Change,
    Append,
    Insert,
    Pick,
    Poke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NShotMode {
    /// Run the branch for the first N calls, then return null.
    UntilN,
    /// Return null for the first N calls, then run the branch.
    AfterN,
}

#[derive(Debug, Clone)]
pub enum DispatcherKind {
    Native(NativeOp),
    /// Body block (an `ArrayStore`-registered `StubId`) evaluated with a
    /// definitional RETURN bound to the frame.
    Func { body: StubId },
    /// Like `Func` but no injected RETURN and no return-type typecheck.
    Lambda { body: StubId },
    /// Runs `prelude` bound to the frame, then tail-delegates to `adaptee`.
    Adapt { prelude: StubId, adaptee: ActionId },
    /// Runs each step in turn, feeding the prior result as the next step's
    /// sole argument.
    Chain { steps: Vec<ActionId> },
    /// Builds a frame for `inner` but hands it as an argument to `outer`
    /// instead of invoking `inner` directly.
    Enclose { inner: ActionId, outer: ActionId },
    /// Overlays a specialization varlist (pre-filled argument values) on
    /// the frame before delegating to `base`.
    Specialize { base: ActionId, overlay: ContextId },
    /// Calls through `replacement`'s dispatcher; if paramlists diverge, a
    /// frame-remapping adapter frame is built first.
    Hijack { replacement: ActionId },
    /// Consumes the next callsite invocation as data instead of running
    /// it, storing the built (but un-executed) frame into `into_arg`.
    Reframe { target: ActionId, into_arg: usize },
    NShot { mode: NShotMode, n: i64, branch: StubId },
    /// A generator body (spec.md §4.I). Each call drives its own private
    /// `LevelStack` to completion or suspension rather than cooperatively
    /// sharing the caller's — see `crate::generator` module docs for why.
    Generator { body: StubId },
}

#[derive(Debug, Clone)]
pub struct ActionEntry {
    pub paramlist: ParamList,
    pub details: Details,
    pub dispatcher: DispatcherKind,
    /// Enfix binding (spec.md §4.G "Infix lookahead"): when true, the
    /// evaluator may treat a bound word naming this action as an infix
    /// operator and seed its first Normal parameter with the
    /// already-produced left-hand value instead of requesting it from the
    /// feed.
    pub infix: bool,
}

impl ActionEntry {
    pub fn new(paramlist: ParamList, details: Details, dispatcher: DispatcherKind) -> Self {
        Self { paramlist, details, dispatcher, infix: false }
    }

    pub fn infix(mut self, on: bool) -> Self {
        self.infix = on;
        self
    }
}

#[derive(Debug, Default)]
pub struct ActionStore {
    actions: HashMap<StubId, ActionEntry>,
}

impl ActionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ActionId, entry: ActionEntry) {
        self.actions.insert(id, entry);
    }

    pub fn get(&self, id: ActionId) -> &ActionEntry {
        self.actions
            .get(&id)
            .expect("ActionId not registered in this ActionStore")
    }

    pub fn get_mut(&mut self, id: ActionId) -> &mut ActionEntry {
        self.actions
            .get_mut(&id)
            .expect("ActionId not registered in this ActionStore")
    }

    pub fn contains(&self, id: ActionId) -> bool {
        self.actions.contains_key(&id)
    }
}
