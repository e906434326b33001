use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use derive_more::*;
use tracing::instrument;
use crate::{tracker_channel, HasId, Tracker, TrackerReceiver, TrackerSender};

/// A hierarchical collection of [`Node`]s with parent/child relationships.
/// Each [`Node`] contains a renderable object.
///
/// * `R` - Renderable type.
///
pub struct SceneGraph<R: HasId> {
    root_ids: Vec<R::Id>,
    nodes: SlotMap<R::Id, Node<R>>,
}

impl<R: HasId> SceneGraph<R> {

    pub fn new() -> Self {
        Self {
            root_ids: Vec::default(),
            nodes: SlotMap::default(),
        }
    }

    pub fn root_ids(&self) -> &[R::Id] {
        &self.root_ids
    }

    /**
     * Inserts a root object and returns its id.
     */
    pub fn insert(&mut self, value: R) -> R::Id {
        let node_id = self.nodes.insert(Node {
            value,
            parent_id: None,
            children_ids: SmallVec::new(),
        });
        self.root_ids.push(node_id);
        node_id
    }

    /**
     * Inserts an object as a child of another.
     */
    pub fn insert_child(&mut self, value: R, parent_id: R::Id) -> Result<R::Id, SceneGraphError> {
        if !self.nodes.contains_key(parent_id) {
            return Err(SceneGraphError::NoSuchNode);
        }
        let node_id = self.nodes.insert(Node {
            value,
            parent_id: Some(parent_id),
            children_ids: SmallVec::new(),
        });
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children_ids.push(node_id);
        }
        Ok(node_id)
    }

    pub fn get(&self, node_id: R::Id) -> Option<&R> {
        self.nodes
            .get(node_id)
            .map(|node| &node.value)
    }

    pub fn get_node(&self, node_id: R::Id) -> Option<&Node<R>> {
        self.nodes.get(node_id)
    }

    pub fn get_mut(&mut self, node_id: R::Id) -> Option<&mut R> {
        self.nodes
            .get_mut(node_id)
            .map(|node| &mut node.value)
    }

    pub fn contains(&self, node_id: R::Id) -> bool {
        self.nodes.contains_key(node_id)
    }

    /**
     * Removes an object along with all of its descendants.
     */
    pub fn remove(&mut self, node_id: R::Id) {
        let Some(node) = self.nodes.get(node_id) else { return };
        match node.parent_id {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(parent_id) {
                    parent.children_ids.retain(|child_id| *child_id != node_id);
                }
            },
            None => self.root_ids.retain(|root_id| *root_id != node_id),
        }
        remove(node_id, &mut self.nodes);
    }

    /**
     * The number of [`Node`]s stored.
     */
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recursive fold-like operation starting at the root nodes.
    /// Value accumulates from parent to child.
    /// Useful for implementing transform propagation.
    pub fn propagate<'a, A, F>(&'a self, accum: A, mut function: F)
    where
        A: Clone,
        F: FnMut(A, &'a R) -> A
    {
        for root_id in &self.root_ids {
            propagate_at(&self.nodes, *root_id, accum.clone(), &mut function);
        };
    }
}

impl<R: HasId> Default for SceneGraph<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn propagate_at<'a, R: HasId, A, F>(
    nodes: &'a SlotMap<R::Id, Node<R>>,
    node_id: R::Id,
    accum: A,
    function: &mut F
)
where
    A: Clone,
    F: FnMut(A, &'a R) -> A
{
    let Some(node) = nodes.get(node_id) else { return };
    let current = function(accum, &node.value);
    for child_id in &node.children_ids {
        propagate_at(nodes, *child_id, current.clone(), function);
    }
}

fn remove<R: HasId>(node_id: R::Id, nodes: &mut SlotMap<R::Id, Node<R>>) {
    let Some(node) = nodes.remove(node_id) else { return };
    for child_id in &node.children_ids {
        remove(*child_id, nodes);
    }
}

/// Container of a scene graph value, and a reference to its parent and children.
pub struct Node<R: HasId> {
    value: R,
    parent_id: Option<R::Id>,
    children_ids: SmallVec<[R::Id; 8]>,
}

impl<R: HasId> Node<R> {
    pub fn value(&self) -> &R {
        &self.value
    }
    pub fn parent_id(&self) -> Option<R::Id> {
        self.parent_id
    }
    pub fn children_ids(&self) -> &[R::Id] {
        &self.children_ids
    }
}

new_key_type! {
    /**
     * ID for a [`Node`].
     */
    pub struct NodeId;
}

#[derive(Error, Display, Debug)]
pub enum SceneGraphError {
    #[display(fmt="No such node")]
    NoSuchNode,
}


/// Wrapper for a [`SceneGraph`] which adds tracking.
/// Nodes are removed on the next [`Scene::prune_nodes`] after their [`Tracker`] drops.
pub struct Scene<R: HasId> {
    pub graph: SceneGraph<R>,
    sender: TrackerSender<R>,
    receiver: TrackerReceiver<R>,
}

impl<R: HasId> Scene<R> {

    pub fn new() -> Self {
        let (sender, receiver) = tracker_channel();
        Self {
            graph: SceneGraph::new(),
            sender,
            receiver,
        }
    }

    /**
     * Inserts a root object and returns a tracker.
     */
    pub fn insert(&mut self, value: R) -> Tracker<R> {
        let id = self.graph.insert(value);
        Tracker::new(id, self.sender.clone())
    }

    pub fn insert_child(&mut self, value: R, parent_id: R::Id) -> Result<Tracker<R>, SceneGraphError> {
        let node_id = self.graph.insert_child(value, parent_id)?;
        Ok(Tracker::new(node_id, self.sender.clone()))
    }

    pub fn get_mut(&mut self, node_id: R::Id) -> Option<&mut R> {
        self.graph.get_mut(node_id)
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Removes nodes whose trackers were dropped.
    #[instrument(skip_all)]
    pub fn prune_nodes(&mut self) {
        for node_id in self.receiver.iter() {
            self.graph.remove(node_id);
        }
    }
}

impl<R: HasId> Default for Scene<R> {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod test {
    use crate::{HasId, NodeId, Scene, SceneGraph, SceneGraphError};

    struct Value(u32);
    impl HasId for Value {
        type Id = NodeId;
    }

    #[test]
    fn remove_is_recursive() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Value(1));
        let child = graph.insert_child(Value(2), root).unwrap();
        let grandchild = graph.insert_child(Value(3), child).unwrap();
        let other = graph.insert(Value(4));
        assert_eq!(4, graph.len());

        graph.remove(child);
        assert_eq!(2, graph.len());
        assert!(!graph.contains(grandchild));
        assert!(graph.get_node(root).unwrap().children_ids().is_empty());
        assert_eq!(&[root, other], graph.root_ids());
    }

    #[test]
    fn propagate_accumulates() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Value(1));
        let child = graph.insert_child(Value(10), root).unwrap();
        graph.insert_child(Value(100), child).unwrap();
        graph.insert(Value(1000));

        let mut sums = Vec::new();
        graph.propagate(0, |sum, value| {
            let sum = sum + value.0;
            sums.push(sum);
            sum
        });
        sums.sort();
        assert_eq!(vec![1, 11, 111, 1000], sums);
    }

    #[test]
    fn missing_parent() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Value(1));
        graph.remove(root);
        let result = graph.insert_child(Value(2), root);
        assert!(matches!(result, Err(SceneGraphError::NoSuchNode)));
        assert!(graph.is_empty());
    }

    #[test]
    fn dropped_trackers_are_pruned() {
        let mut scene = Scene::new();
        let group = scene.insert(Value(1));
        let child = scene.insert_child(Value(2), group.id()).unwrap();
        let kept = scene.insert(Value(3));
        drop(child);
        scene.prune_nodes();
        assert_eq!(2, scene.len());

        // Dropping a parent takes its children with it.
        let child = scene.insert_child(Value(4), group.id()).unwrap();
        drop(group);
        scene.prune_nodes();
        assert_eq!(1, scene.len());
        assert!(scene.get_mut(child.id()).is_none());
        assert!(scene.get_mut(kept.id()).is_some());

        // Tracker of an already removed node.
        drop(child);
        scene.prune_nodes();
        assert_eq!(1, scene.len());
    }
}
