//! Example spaces: lazy rose trees of a value and its simplifications.

use crate::data::splitmix64_mix;
use crate::shrink::Shrinks;
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

pub mod render;

const MERGE_SALT: u64 = 0x6d65_7267_6564_5f69;
const COMBINE_SALT: u64 = 0x636f_6d62_696e_6564;

/// Structural identity of an example.
///
/// Two nodes with the same id denote the same logical example, whatever
/// tree they were found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExampleId(u64);

impl ExampleId {
    /// Identity derived from the structural content of a value.
    pub fn of<T: Hash + ?Sized>(value: &T) -> Self {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        ExampleId(hasher.finish())
    }

    pub fn from_raw(raw: u64) -> Self {
        ExampleId(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Order-sensitive combination of two identities.
    pub fn combine(self, other: ExampleId) -> Self {
        let right = splitmix64_mix(other.0 ^ COMBINE_SALT);
        ExampleId(splitmix64_mix(self.0.rotate_left(17) ^ right))
    }

    /// Identity of a node merged from `ids`, never equal to any of them.
    pub fn merge(ids: &[ExampleId]) -> Self {
        let mut acc = splitmix64_mix(MERGE_SALT ^ ids.len() as u64);
        for id in ids {
            acc = splitmix64_mix(acc.rotate_left(23) ^ id.0);
        }
        while ids.iter().any(|id| id.0 == acc) {
            acc = splitmix64_mix(acc.wrapping_add(1));
        }
        ExampleId(acc)
    }
}

impl fmt::Display for ExampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A value with its identity and distance from the simplest value.
///
/// A distance of 0 means the value cannot be simplified further.
#[derive(Debug, Clone, PartialEq)]
pub struct Example<T> {
    pub id: ExampleId,
    pub value: T,
    pub distance: f64,
}

impl<T> Example<T> {
    pub fn new(id: ExampleId, value: T, distance: f64) -> Self {
        Example {
            id,
            value,
            distance,
        }
    }
}

type Subspace<T> = Rc<dyn Fn() -> Shrinks<ExampleSpace<T>>>;

/// A lazy rose tree holding an example and all its candidate simplifications.
///
/// The subspace is recomputed every time it is requested, so a space can be
/// walked any number of times and never links back to its parent. Cloning is
/// cheap.
pub struct ExampleSpace<T> {
    pub current: Example<T>,
    subspace: Subspace<T>,
}

impl<T: Clone> Clone for ExampleSpace<T> {
    fn clone(&self) -> Self {
        ExampleSpace {
            current: self.current.clone(),
            subspace: self.subspace.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ExampleSpace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExampleSpace")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// Spaces compare by identity, not by value.
impl<T> PartialEq for ExampleSpace<T> {
    fn eq(&self, other: &Self) -> bool {
        self.current.id == other.current.id
    }
}

impl<T: 'static> ExampleSpace<T> {
    /// Create a space from its root example and a subspace thunk.
    pub fn new<F>(current: Example<T>, subspace: F) -> Self
    where
        F: Fn() -> Shrinks<ExampleSpace<T>> + 'static,
    {
        ExampleSpace {
            current,
            subspace: Rc::new(subspace),
        }
    }

    /// A space with no simplifications.
    pub fn singleton(value: T) -> Self
    where
        T: Hash,
    {
        let id = ExampleId::of(&value);
        Self::leaf(Example::new(id, value, 0.0))
    }

    /// A space with a fixed example and no simplifications.
    pub fn leaf(current: Example<T>) -> Self {
        Self::new(current, || Box::new(std::iter::empty()))
    }

    /// Build a space eagerly from a root and already-built children.
    pub fn with_children(current: Example<T>, children: Vec<ExampleSpace<T>>) -> Self
    where
        T: Clone,
    {
        let children = Rc::new(children);
        Self::new(current, move || Box::new((*children).clone().into_iter()))
    }

    /// Grow a space from a value by repeatedly applying a shrink function.
    ///
    /// Immediate children never repeat an identity, and never repeat the
    /// identity of their parent.
    pub fn unfold<S, M, I>(value: T, shrink: S, measure: M, identify: I) -> Self
    where
        T: Clone,
        S: Fn(&T) -> Shrinks<T> + 'static,
        M: Fn(&T) -> f64 + 'static,
        I: Fn(&T) -> ExampleId + 'static,
    {
        Self::unfold_rc(value, Rc::new(shrink), Rc::new(measure), Rc::new(identify))
    }

    fn unfold_rc(
        value: T,
        shrink: Rc<dyn Fn(&T) -> Shrinks<T>>,
        measure: Rc<dyn Fn(&T) -> f64>,
        identify: Rc<dyn Fn(&T) -> ExampleId>,
    ) -> Self
    where
        T: Clone,
    {
        let current = Example::new(identify(&value), value.clone(), measure(&value));
        let parent_id = current.id;

        Self::new(current, move || {
            let (shrink, measure, identify) = (shrink.clone(), measure.clone(), identify.clone());
            let mut seen = HashSet::from([parent_id]);
            let candidates = shrink(&value);
            Box::new(
                candidates
                    .map(move |candidate| {
                        Self::unfold_rc(candidate, shrink.clone(), measure.clone(), identify.clone())
                    })
                    .filter(move |child| seen.insert(child.current.id)),
            )
        })
    }

    /// The value at the root of the space.
    pub fn value(&self) -> &T {
        &self.current.value
    }

    /// Walk the immediate simplifications of the root.
    pub fn subspace(&self) -> Shrinks<ExampleSpace<T>> {
        (self.subspace)()
    }

    /// Transform every value in the space, keeping identities and distances.
    pub fn map<U, F>(&self, f: F) -> ExampleSpace<U>
    where
        U: 'static,
        F: Fn(&T) -> U + 'static,
    {
        self.map_rc(Rc::new(f))
    }

    fn map_rc<U: 'static>(&self, f: Rc<dyn Fn(&T) -> U>) -> ExampleSpace<U> {
        let subspace = self.subspace.clone();
        let current = Example::new(self.current.id, f(&self.current.value), self.current.distance);

        ExampleSpace::new(current, move || {
            let f = f.clone();
            Box::new(subspace().map(move |child| child.map_rc(f.clone())))
        })
    }

    /// Keep only the nodes satisfying `pred`.
    ///
    /// Returns `None` when the root itself fails; children that fail are
    /// pruned along with everything beneath them.
    pub fn filter<P>(&self, pred: P) -> Option<Self>
    where
        T: Clone,
        P: Fn(&T) -> bool + 'static,
    {
        self.filter_rc(Rc::new(pred))
    }

    fn filter_rc(&self, pred: Rc<dyn Fn(&T) -> bool>) -> Option<Self>
    where
        T: Clone,
    {
        if !pred(&self.current.value) {
            return None;
        }

        let subspace = self.subspace.clone();
        Some(Self::new(self.current.clone(), move || {
            let pred = pred.clone();
            Box::new(subspace().filter_map(move |child| child.filter_rc(pred.clone())))
        }))
    }

    /// Merge several spaces into one.
    ///
    /// The merged subspace first offers the structural candidates produced by
    /// `shrink` over the list of spaces, then every simplification of each
    /// source space with the others held fixed.
    pub fn merge<U, C, S, M>(
        spaces: Vec<ExampleSpace<T>>,
        combine: C,
        shrink: S,
        measure: M,
    ) -> ExampleSpace<U>
    where
        T: Clone,
        U: 'static,
        C: Fn(&[T]) -> U + 'static,
        S: Fn(&Vec<ExampleSpace<T>>) -> Shrinks<Vec<ExampleSpace<T>>> + 'static,
        M: Fn(&[ExampleSpace<T>]) -> f64 + 'static,
    {
        merge_rc(
            Rc::new(spaces),
            Rc::new(MergeFns {
                combine: Box::new(combine),
                shrink: Box::new(shrink),
                measure: Box::new(measure),
            }),
        )
    }

    /// Follow a path of subspace indices from the root.
    pub fn navigate(&self, path: &[usize]) -> Option<Self>
    where
        T: Clone,
    {
        let mut node = self.clone();
        for &index in path {
            node = node.subspace().nth(index)?;
        }
        Some(node)
    }

    /// Search for nodes whose value fails `pred`, greedily descending into
    /// the first failing child of each failing node.
    ///
    /// A panic inside `pred` counts as a failure and its message is captured.
    pub fn counterexamples<P>(&self, pred: P) -> Counterexamples<T>
    where
        T: Clone,
        P: Fn(&T) -> bool + 'static,
    {
        Counterexamples {
            pred: Rc::new(pred),
            root: Some(self.clone()),
            frontier: None,
        }
    }

    /// Depth-first walk over every example in the space.
    pub fn traverse_examples(&self) -> Traverse<T>
    where
        T: Clone,
    {
        Traverse {
            root: Some(self.clone()),
            stack: Vec::new(),
        }
    }

    /// Depth-first walk over every value in the space.
    pub fn traverse(&self) -> impl Iterator<Item = T>
    where
        T: Clone,
    {
        self.traverse_examples().map(|example| example.value)
    }
}

impl<A, B> ExampleSpace<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    /// Pair two spaces; shrinks the left component first, then the right.
    pub fn zip(left: ExampleSpace<A>, right: ExampleSpace<B>) -> Self {
        let current = Example::new(
            ExampleId::merge(&[left.current.id, right.current.id]),
            (left.current.value.clone(), right.current.value.clone()),
            left.current.distance + right.current.distance,
        );

        ExampleSpace::new(current, move || {
            let (fixed_right, fixed_left) = (right.clone(), left.clone());
            Box::new(
                left.subspace()
                    .map(move |l| ExampleSpace::zip(l, fixed_right.clone()))
                    .chain(right.subspace().map(move |r| ExampleSpace::zip(fixed_left.clone(), r))),
            )
        })
    }
}

struct MergeFns<T, U> {
    combine: Box<dyn Fn(&[T]) -> U>,
    shrink: Box<dyn Fn(&Vec<ExampleSpace<T>>) -> Shrinks<Vec<ExampleSpace<T>>>>,
    measure: Box<dyn Fn(&[ExampleSpace<T>]) -> f64>,
}

fn merge_rc<T, U>(spaces: Rc<Vec<ExampleSpace<T>>>, fns: Rc<MergeFns<T, U>>) -> ExampleSpace<U>
where
    T: Clone + 'static,
    U: 'static,
{
    let values: Vec<T> = spaces.iter().map(|space| space.current.value.clone()).collect();
    let ids: Vec<ExampleId> = spaces.iter().map(|space| space.current.id).collect();
    let current = Example::new(
        ExampleId::merge(&ids),
        (fns.combine)(&values),
        (fns.measure)(&spaces),
    );

    ExampleSpace::new(current, move || {
        let candidates = (fns.shrink)(&spaces);
        let structural_fns = fns.clone();
        let structural = candidates
            .map(move |candidate| merge_rc(Rc::new(candidate), structural_fns.clone()));

        let (sources, fns) = (spaces.clone(), fns.clone());
        let componentwise = (0..sources.len()).flat_map(move |index| {
            let (sources, fns) = (sources.clone(), fns.clone());
            sources[index].subspace().map(move |child| {
                let mut replaced = (*sources).clone();
                replaced[index] = child;
                merge_rc(Rc::new(replaced), fns.clone())
            })
        });

        Box::new(structural.chain(componentwise))
    })
}

/// A failing node found while searching an example space.
#[derive(Debug, Clone)]
pub struct Counterexample<T> {
    pub space: ExampleSpace<T>,
    /// Subspace indices leading from the root to `space`.
    pub path: Vec<usize>,
    /// Panic message captured while evaluating the predicate.
    pub exception: Option<String>,
}

/// Lazy greedy search for failing nodes. See [`ExampleSpace::counterexamples`].
pub struct Counterexamples<T> {
    pred: Rc<dyn Fn(&T) -> bool>,
    root: Option<ExampleSpace<T>>,
    frontier: Option<(Shrinks<ExampleSpace<T>>, Vec<usize>, usize)>,
}

impl<T: Clone + 'static> Iterator for Counterexamples<T> {
    type Item = Counterexample<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            let exception = evaluate(self.pred.as_ref(), root.value())?;
            self.frontier = Some((guarded_subspace(&root), Vec::new(), 0));
            return Some(Counterexample {
                space: root,
                path: Vec::new(),
                exception,
            });
        }

        let (mut children, path, mut index) = self.frontier.take()?;
        for child in children.by_ref() {
            let position = index;
            index += 1;

            if let Some(exception) = evaluate(self.pred.as_ref(), child.value()) {
                let mut child_path = path.clone();
                child_path.push(position);
                self.frontier = Some((guarded_subspace(&child), child_path.clone(), 0));
                return Some(Counterexample {
                    space: child,
                    path: child_path,
                    exception,
                });
            }
        }

        None
    }
}

/// The subspace of `space`, cut short at the first panic raised while
/// producing a child. A node whose simplifications panic is treated as
/// having no further simplifications.
fn guarded_subspace<T: 'static>(space: &ExampleSpace<T>) -> Shrinks<ExampleSpace<T>> {
    match catch_unwind(AssertUnwindSafe(|| space.subspace())) {
        Ok(children) => Box::new(GuardedChildren(Some(children))),
        Err(_) => Box::new(std::iter::empty()),
    }
}

struct GuardedChildren<T>(Option<Shrinks<ExampleSpace<T>>>);

impl<T> Iterator for GuardedChildren<T> {
    type Item = ExampleSpace<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let children = self.0.as_mut()?;
        match catch_unwind(AssertUnwindSafe(|| children.next())) {
            Ok(child) => child,
            Err(_) => {
                self.0 = None;
                None
            }
        }
    }
}

/// `None` if the value passes, otherwise the captured panic message, if any.
fn evaluate<T>(pred: &dyn Fn(&T) -> bool, value: &T) -> Option<Option<String>> {
    match catch_unwind(AssertUnwindSafe(|| pred(value))) {
        Ok(true) => None,
        Ok(false) => Some(None),
        Err(payload) => Some(Some(panic_message(payload.as_ref()))),
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

/// Depth-first walk over an example space. See [`ExampleSpace::traverse_examples`].
pub struct Traverse<T> {
    root: Option<ExampleSpace<T>>,
    stack: Vec<Shrinks<ExampleSpace<T>>>,
}

impl<T: Clone + 'static> Iterator for Traverse<T> {
    type Item = Example<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            self.stack.push(root.subspace());
            return Some(root.current);
        }

        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => {
                    self.stack.push(node.subspace());
                    return Some(node.current);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
