use component_graph::{
    Component, ConstructError, Dep, Dependencies, RegistrationError, ResolveError, Resolver, Views,
};
use std::cell::Cell;
use std::rc::Rc;

// --- Test Components ---

trait Counter {
    fn counter(&self) -> u32;
}

#[derive(Debug)]
struct LowLevel {
    counter: u32,
    calls: Rc<Cell<u32>>,
}

impl LowLevel {
    fn new(counter: u32) -> Self {
        Self {
            counter,
            calls: Rc::new(Cell::new(0)),
        }
    }
}

impl Counter for LowLevel {
    fn counter(&self) -> u32 {
        self.counter
    }
}

impl Component for LowLevel {
    type Instance = LowLevel;

    fn expose(views: &mut Views<LowLevel>) {
        views.provide::<dyn Counter>(|low| low);
    }

    fn construct(&self) -> Result<LowLevel, ConstructError> {
        self.calls.set(self.calls.get() + 1);
        Ok(LowLevel {
            counter: self.counter,
            calls: self.calls.clone(),
        })
    }
}

#[derive(Default)]
struct TopLevel {
    low: Dep<dyn Counter>,
}

impl Component for TopLevel {
    type Instance = TopLevel;

    fn dependencies(deps: &mut Dependencies<Self>) {
        deps.named::<dyn Counter>("LowLevel", |top, low| top.low.fill(low));
    }

    fn construct(&self) -> Result<TopLevel, ConstructError> {
        Ok(TopLevel {
            low: self.low.clone(),
        })
    }
}

/// Depends on `LowLevel` through its concrete type, name derived implicitly.
#[derive(Default)]
struct Middle {
    low: Dep<LowLevel>,
}

impl Component for Middle {
    type Instance = Middle;

    fn dependencies(deps: &mut Dependencies<Self>) {
        deps.typed::<LowLevel>(|middle, low| middle.low.fill(low));
    }

    fn construct(&self) -> Result<Middle, ConstructError> {
        Ok(Middle {
            low: self.low.clone(),
        })
    }
}

/// Shared state behind the tagged graph components declared by `node_component!`.
struct Node {
    tag: &'static str,
    calls: Rc<Cell<u32>>,
    wired: Vec<(&'static str, Rc<String>)>,
}

impl Node {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            calls: Rc::new(Cell::new(0)),
            wired: Vec::new(),
        }
    }

    /// Stores the value for `dependency`, replacing an earlier wiring of it.
    fn wire(&mut self, dependency: &'static str, value: Rc<String>) {
        match self.wired.iter_mut().find(|(name, _)| *name == dependency) {
            Some(entry) => entry.1 = value,
            None => self.wired.push((dependency, value)),
        }
    }
}

macro_rules! node_component {
    ($ty:ident, $name:literal, [$($dep:literal),*]) => {
        struct $ty(Node);

        impl Component for $ty {
            type Instance = String;
            const NAME: Option<&'static str> = Some($name);

            fn dependencies(deps: &mut Dependencies<Self>) {
                $(deps.named::<String>($dep, |n, v| n.0.wire($dep, v));)*
            }

            fn construct(&self) -> Result<String, ConstructError> {
                self.0.calls.set(self.0.calls.get() + 1);
                let inner: Vec<&str> = self.0.wired.iter().map(|(_, s)| s.as_str()).collect();
                Ok(format!("{}({})", self.0.tag, inner.join(",")))
            }
        }
    };
}

node_component!(CycleA, "A", ["B"]);
node_component!(CycleB, "B", ["A"]);
node_component!(SelfRef, "Loop", ["Loop"]);
node_component!(ChainA, "ChainA", ["ChainB"]);
node_component!(ChainB, "ChainB", ["ChainC"]);
node_component!(ChainC, "ChainC", ["ChainA"]);
node_component!(NeedsMissing, "NeedsMissing", ["Missing"]);
node_component!(Missing, "Missing", []);
node_component!(Root, "Root", ["Left", "Right"]);
node_component!(Left, "Left", ["Shared"]);
node_component!(Right, "Right", ["Shared"]);
node_component!(Shared, "Shared", []);
node_component!(Pair, "Pair", ["Shared", "Late"]);
node_component!(Late, "Late", []);

struct Failing;

impl Component for Failing {
    type Instance = ();

    fn construct(&self) -> Result<(), ConstructError> {
        Err(ConstructError::failed(std::io::Error::other("storage unreachable")))
    }
}

struct Panicking;

impl Component for Panicking {
    type Instance = ();

    fn construct(&self) -> Result<(), ConstructError> {
        panic!("initializer exploded");
    }
}

/// Its only slot setter panics.
struct SetterPanics;

impl Component for SetterPanics {
    type Instance = ();

    fn dependencies(deps: &mut Dependencies<Self>) {
        deps.typed::<LowLevel>(|_, _| panic!("setter exploded"));
    }

    fn construct(&self) -> Result<(), ConstructError> {
        Ok(())
    }
}

/// Two unrelated types whose derived names are both `Config`.
mod a {
    use component_graph::{Component, ConstructError};

    pub struct Config;

    impl Component for Config {
        type Instance = u32;

        fn construct(&self) -> Result<u32, ConstructError> {
            Ok(8080)
        }
    }
}

mod b {
    use component_graph::{Component, ConstructError};

    pub struct Config;

    impl Component for Config {
        type Instance = String;

        fn construct(&self) -> Result<String, ConstructError> {
            Ok("b".to_string())
        }
    }
}

#[derive(Default)]
struct UsesA {
    port: Dep<u32>,
}

impl Component for UsesA {
    type Instance = u32;

    fn dependencies(deps: &mut Dependencies<Self>) {
        deps.typed::<a::Config>(|uses, port| uses.port.fill(port));
    }

    fn construct(&self) -> Result<u32, ConstructError> {
        self.port.get().map(|port| *port)
    }
}

/// Takes over the `Config` name on purpose.
struct OverrideConfig;

impl Component for OverrideConfig {
    type Instance = u32;
    const NAME: Option<&'static str> = Some("Config");

    fn construct(&self) -> Result<u32, ConstructError> {
        Ok(9090)
    }
}

/// Asks for `dyn Counter` from a component that only provides a `String`.
struct WantsCounter {
    low: Dep<dyn Counter>,
    calls: Rc<Cell<u32>>,
}

impl Component for WantsCounter {
    type Instance = ();

    fn dependencies(deps: &mut Dependencies<Self>) {
        deps.named::<dyn Counter>("Shared", |w, low| w.low.fill(low));
    }

    fn construct(&self) -> Result<(), ConstructError> {
        self.calls.set(self.calls.get() + 1);
        self.low.get().map(|_| ())
    }
}

// --- Tests ---

#[test]
fn top_level_receives_low_level_counter() {
    let mut resolver = Resolver::new();
    resolver.register(LowLevel::new(12)).unwrap();
    resolver.register(TopLevel::default()).unwrap();

    let top = resolver.get_as::<TopLevel>("TopLevel").unwrap();
    assert_eq!(top.low.get().unwrap().counter(), 12);
}

#[test]
fn repeated_get_returns_same_instance_without_reinitializing() {
    let low = LowLevel::new(3);
    let calls = low.calls.clone();
    let mut resolver = Resolver::new();
    resolver.register(low).unwrap();
    resolver.register(Middle::default()).unwrap();

    let first = resolver.get("Middle").unwrap();
    let second = resolver.get("Middle").unwrap();
    assert!(first.ptr_eq(&second));

    // The wired dependency is the cached LowLevel instance.
    let middle = first.get::<Middle>().unwrap();
    let cached_low = resolver.get_as::<LowLevel>("LowLevel").unwrap();
    assert!(Rc::ptr_eq(&middle.low.get().unwrap(), &cached_low));

    assert_eq!(calls.get(), 1);
}

#[test]
fn leaf_component_resolves_to_its_own_initializer_output() {
    let mut resolver = Resolver::new();
    resolver.register(Shared(Node::new("shared"))).unwrap();

    let handle = resolver.get("Shared").unwrap();
    assert_eq!(handle.get::<String>().unwrap().as_str(), "shared()");
    assert_eq!(handle.name(), "Shared");
    assert!(resolver.is_resolved("Shared"));
}

#[test]
fn mutual_dependency_is_a_cycle_naming_both() {
    let mut resolver = Resolver::new();
    resolver.register(CycleA(Node::new("a"))).unwrap();
    resolver.register(CycleB(Node::new("b"))).unwrap();

    let err = resolver.get("A").unwrap_err();
    let msg = err.to_string();
    assert!(err.is_cycle());
    assert!(msg.contains("'A'"), "{msg}");
    assert!(msg.contains("'B'"), "{msg}");

    // Neither side was cached.
    assert!(!resolver.is_resolved("A"));
    assert!(!resolver.is_resolved("B"));

    // The path is released, so the same error comes back instead of a stale state.
    assert!(resolver.get("B").unwrap_err().is_cycle());
}

#[test]
fn self_reference_and_long_cycles_are_detected() {
    let mut resolver = Resolver::new();
    resolver.register(SelfRef(Node::new("loop"))).unwrap();
    match resolver.get("Loop").unwrap_err() {
        ResolveError::Cycle {
            component,
            dependency,
            ..
        } => {
            assert_eq!(component, "Loop");
            assert_eq!(dependency, "Loop");
        }
        other => panic!("expected cycle, got {other}"),
    }

    resolver.register(ChainA(Node::new("a"))).unwrap();
    resolver.register(ChainB(Node::new("b"))).unwrap();
    resolver.register(ChainC(Node::new("c"))).unwrap();
    match resolver.get("ChainA").unwrap_err() {
        ResolveError::Cycle {
            component,
            dependency,
            path,
        } => {
            assert_eq!(component, "ChainC");
            assert_eq!(dependency, "ChainA");
            assert_eq!(path, vec!["ChainA", "ChainB", "ChainC", "ChainA"]);
        }
        other => panic!("expected cycle, got {other}"),
    }
}

#[test]
fn missing_dependency_fails_and_recovers_after_registration() {
    let mut resolver = Resolver::new();
    resolver.register(NeedsMissing(Node::new("needs"))).unwrap();

    let err = resolver.get("NeedsMissing").unwrap_err();
    assert!(err.is_unregistered());
    assert_eq!(err.component(), "Missing");
    assert!(!resolver.is_resolved("NeedsMissing"));

    resolver.register(Missing(Node::new("missing"))).unwrap();
    let value = resolver.get_as::<String>("NeedsMissing").unwrap();
    assert_eq!(value.as_str(), "needs(missing())");
}

#[test]
fn unknown_root_is_unregistered() {
    let mut resolver = Resolver::new();
    assert!(matches!(
        resolver.get("Nope"),
        Err(ResolveError::Unregistered { name }) if name == "Nope"
    ));
}

#[test]
fn shared_dependency_is_initialized_once_in_a_diamond() {
    let shared = Node::new("shared");
    let calls = shared.calls.clone();
    let mut resolver = Resolver::new();
    resolver.register(Root(Node::new("root"))).unwrap();
    resolver.register(Left(Node::new("left"))).unwrap();
    resolver.register(Right(Node::new("right"))).unwrap();
    resolver.register(Shared(shared)).unwrap();

    let root = resolver.get_as::<String>("Root").unwrap();
    assert_eq!(root.as_str(), "root(left(shared()),right(shared()))");
    assert_eq!(calls.get(), 1);
    assert_eq!(resolver.warm_up().unwrap(), 0);
}

#[test]
fn type_mismatch_fails_before_dependent_initializer_runs() {
    let calls = Rc::new(Cell::new(0));
    let mut resolver = Resolver::new();
    resolver.register(Shared(Node::new("shared"))).unwrap();
    resolver
        .register(WantsCounter {
            low: Dep::empty(),
            calls: calls.clone(),
        })
        .unwrap();

    match resolver.get("WantsCounter").unwrap_err() {
        ResolveError::TypeMismatch {
            component,
            dependency,
            found,
            expected,
        } => {
            assert_eq!(component, "WantsCounter");
            assert_eq!(dependency, "Shared");
            assert_eq!(found, "alloc::string::String");
            assert!(expected.contains("Counter"), "{expected}");
        }
        other => panic!("expected type mismatch, got {other}"),
    }
    assert_eq!(calls.get(), 0);
    assert!(!resolver.is_resolved("WantsCounter"));
}

#[test]
fn get_as_with_the_wrong_type_is_a_mismatch() {
    let mut resolver = Resolver::new();
    resolver.register(LowLevel::new(1)).unwrap();
    assert!(matches!(
        resolver.get_as::<String>("LowLevel"),
        Err(ResolveError::TypeMismatch { .. })
    ));
    assert_eq!(resolver.get_as::<dyn Counter>("LowLevel").unwrap().counter(), 1);
}

#[test]
fn initializer_errors_and_panics_are_reported_not_propagated() {
    let mut resolver = Resolver::new();
    resolver.register(Failing).unwrap();
    resolver.register(Panicking).unwrap();

    let err = resolver.get("Failing").unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Initialization { ref component, .. } if component == "Failing"
    ));
    assert!(err.to_string().contains("storage unreachable"));

    let err = resolver.get("Panicking").unwrap_err();
    match err {
        ResolveError::Initialization {
            component,
            source: ConstructError::Panicked(msg),
        } => {
            assert_eq!(component, "Panicking");
            assert_eq!(msg, "initializer exploded");
        }
        other => panic!("expected initialization error, got {other}"),
    }
    assert!(resolver.instance("Panicking").is_none());
}

#[test]
fn namespaced_registration_qualifies_the_name() {
    let mut resolver = Resolver::new();
    let name = resolver
        .register_in(&["ns1", "ns2"], Shared(Node::new("shared")))
        .unwrap();
    assert_eq!(name.as_str(), "ns1:ns2:Shared");
    assert!(resolver.contains("ns1:ns2:Shared"));
    assert!(!resolver.contains("Shared"));
    assert!(resolver.get("ns1:ns2:Shared").is_ok());

    assert!(matches!(
        resolver.register_in(&["bad:ns"], Missing(Node::new("m"))),
        Err(RegistrationError::InvalidName { .. })
    ));
    assert!(!resolver.contains("Missing"));
}

#[test]
fn last_registration_wins_until_resolved() {
    let mut resolver = Resolver::new();
    resolver.register(LowLevel::new(1)).unwrap();
    resolver.register(LowLevel::new(2)).unwrap();
    assert_eq!(resolver.len(), 1);
    assert_eq!(resolver.get_as::<LowLevel>("LowLevel").unwrap().counter, 2);

    // The cache is append-only: a later registration does not replace the instance.
    resolver.register(LowLevel::new(3)).unwrap();
    assert_eq!(resolver.get_as::<LowLevel>("LowLevel").unwrap().counter, 2);
}

#[test]
fn descriptors_expose_their_slots() {
    let mut resolver = Resolver::new();
    resolver.register(TopLevel::default()).unwrap();
    resolver.register(Middle::default()).unwrap();

    let top = resolver.descriptor("TopLevel").unwrap();
    assert_eq!(top.slots().len(), 1);
    assert_eq!(top.slots()[0].dependency, "LowLevel");
    assert!(top.slots()[0].expected.contains("Counter"));
    assert_eq!(resolver.dependencies_of("Middle"), Some(vec!["LowLevel"]));
}

#[test]
fn retry_after_a_partial_wiring_wires_each_slot_once() {
    let mut resolver = Resolver::new();
    resolver.register(Pair(Node::new("pair"))).unwrap();
    resolver.register(Shared(Node::new("shared"))).unwrap();

    // "Shared" is wired into the blueprint before "Late" turns out to be missing.
    let err = resolver.get("Pair").unwrap_err();
    assert_eq!(err.component(), "Late");
    assert!(resolver.is_resolved("Shared"));

    resolver.register(Late(Node::new("late"))).unwrap();
    let value = resolver.get_as::<String>("Pair").unwrap();
    assert_eq!(value.as_str(), "pair(shared(),late())");
}

#[test]
fn panicking_slot_setter_is_an_initialization_error() {
    let mut resolver = Resolver::new();
    resolver.register(LowLevel::new(1)).unwrap();
    resolver.register(SetterPanics).unwrap();

    match resolver.get("SetterPanics").unwrap_err() {
        ResolveError::Initialization {
            component,
            source: ConstructError::Panicked(msg),
        } => {
            assert_eq!(component, "SetterPanics");
            assert_eq!(msg, "setter exploded");
        }
        other => panic!("expected initialization error, got {other}"),
    }
    assert!(!resolver.is_resolved("SetterPanics"));
    assert!(resolver.is_resolved("LowLevel"));
}

#[test]
fn same_named_types_from_different_modules_do_not_replace_each_other() {
    let mut resolver = Resolver::new();
    resolver.register(a::Config).unwrap();
    resolver.register(UsesA::default()).unwrap();

    match resolver.register(b::Config).unwrap_err() {
        RegistrationError::NameCollision {
            name,
            existing,
            registered,
        } => {
            assert_eq!(name, "Config");
            assert!(existing.ends_with("a::Config"), "{existing}");
            assert!(registered.ends_with("b::Config"), "{registered}");
        }
        other => panic!("expected name collision, got {other}"),
    }
    assert_eq!(resolver.len(), 2);
    assert!(resolver.descriptor("Config").unwrap().is_blueprint::<a::Config>());
    assert_eq!(*resolver.get_as::<u32>("UsesA").unwrap(), 8080);

    // Re-registering the same type still replaces, and an explicit tag may take over.
    resolver.register(a::Config).unwrap();
    resolver.register(OverrideConfig).unwrap();
    assert!(resolver.descriptor("Config").unwrap().is_blueprint::<OverrideConfig>());
}
