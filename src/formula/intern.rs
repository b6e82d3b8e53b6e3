//! Content-addressed cache behind formula construction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use once_cell::sync::Lazy;

use super::{Formula, Kind, Node, SyntacticClasses};

const MIN_PRUNE_THRESHOLD: usize = 4096;

/// Key of a node: its kind, proposition name and the identities of its
/// children. Children are alive as long as the node is, so their addresses
/// cannot be reused while a live entry refers to them.
#[derive(PartialEq, Eq, Hash)]
struct NodeKey {
    kind: Kind,
    name: Option<Box<str>>,
    children: Box<[usize]>,
}

struct Interner {
    table: HashMap<NodeKey, Weak<Node>>,
    prune_at: usize,
}

impl Interner {
    fn prune(&mut self) {
        self.table.retain(|_, node| node.strong_count() > 0);
        self.prune_at = (self.table.len() * 2).max(MIN_PRUNE_THRESHOLD);
    }
}

static INTERNER: Lazy<Mutex<Interner>> = Lazy::new(|| {
    Mutex::new(Interner {
        table: HashMap::new(),
        prune_at: MIN_PRUNE_THRESHOLD,
    })
});

pub(super) fn intern(kind: Kind, name: Option<&str>, children: Vec<Formula>) -> Formula {
    let key = NodeKey {
        kind,
        name: name.map(Box::from),
        children: children.iter().map(Formula::id).collect(),
    };

    let mut interner = INTERNER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(node) = interner.table.get(&key).and_then(Weak::upgrade) {
        return Formula(node);
    }

    let classes = SyntacticClasses::derive(kind, &children);
    let node = Arc::new(Node {
        kind,
        name: key.name.clone(),
        children: children.into_boxed_slice(),
        classes,
    });
    interner.table.insert(key, Arc::downgrade(&node));
    if interner.table.len() >= interner.prune_at {
        interner.prune();
    }
    Formula(node)
}
