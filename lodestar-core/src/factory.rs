//! Generator factory: build generators for types from registered strategies.
//!
//! Strategies form a closed set: a registered generator, a list of some
//! element type, or a constructor that resolves the generators of its
//! members through the factory. Resolution carries a [`FactoryContext`]
//! with the member path and the types being resolved, so a type that
//! contains itself is reported instead of recursing forever.

use crate::error::{LodestarError, Result};
use crate::gen::Gen;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Runtime identity of a type that generators can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: 'static>() -> Self {
        TypeDescriptor {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path or generic arguments.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Where a resolution is happening: the member path from the requested type
/// and every type currently being resolved.
#[derive(Debug, Clone, Default)]
pub struct FactoryContext {
    path: Vec<String>,
    visited: Vec<TypeDescriptor>,
}

impl FactoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Member path joined with dots, such as `Tree.root.children`.
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    pub fn visited(&self) -> &[TypeDescriptor] {
        &self.visited
    }

    fn enter(&self, descriptor: TypeDescriptor, member: &str) -> Result<Self> {
        let mut path = self.path.clone();
        path.push(member.to_string());

        if self.visited.contains(&descriptor) {
            return Err(LodestarError::CircularReference {
                type_name: descriptor.name().to_string(),
                path: path.join("."),
            });
        }

        let mut visited = self.visited.clone();
        visited.push(descriptor);
        Ok(FactoryContext { path, visited })
    }
}

/// A type-erased `Gen<T>`.
type ErasedGen = Rc<dyn Any>;
type Build = Rc<dyn Fn(&GenFactory, &FactoryContext) -> Result<ErasedGen>>;

enum Strategy {
    Registered(ErasedGen),
    ListOf(Build),
    Constructor(Build),
}

/// Registry from types to generator strategies.
#[derive(Default)]
pub struct GenFactory {
    strategies: HashMap<TypeId, Strategy>,
}

impl GenFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `gen` whenever a `T` is requested.
    pub fn register<T: 'static>(mut self, gen: Gen<T>) -> Self {
        self.strategies
            .insert(TypeId::of::<T>(), Strategy::Registered(Rc::new(gen)));
        self
    }

    /// Generate `Vec<E>` from the generator resolved for `E`.
    pub fn register_list<E: Clone + 'static>(mut self, min_length: usize, max_length: usize) -> Self {
        let build: Build = Rc::new(move |factory: &GenFactory, context: &FactoryContext| {
            let element = factory.resolve::<E>(context, "element")?;
            Ok(Rc::new(Gen::list_of(element, min_length, max_length)) as ErasedGen)
        });
        self.strategies
            .insert(TypeId::of::<Vec<E>>(), Strategy::ListOf(build));
        self
    }

    /// Build a `T` from generators of its members, resolved through the
    /// factory with [`GenFactory::resolve`].
    pub fn register_constructor<T, F>(mut self, constructor: F) -> Self
    where
        T: 'static,
        F: Fn(&GenFactory, &FactoryContext) -> Result<Gen<T>> + 'static,
    {
        let build: Build = Rc::new(move |factory: &GenFactory, context: &FactoryContext| {
            constructor(factory, context).map(|gen| Rc::new(gen) as ErasedGen)
        });
        self.strategies
            .insert(TypeId::of::<T>(), Strategy::Constructor(build));
        self
    }

    /// Whether any strategy is registered for `T`.
    pub fn supports<T: 'static>(&self) -> bool {
        self.strategies.contains_key(&TypeId::of::<T>())
    }

    /// Build a generator for `T`.
    pub fn create<T: 'static>(&self) -> Result<Gen<T>> {
        let descriptor = TypeDescriptor::of::<T>();
        self.resolve::<T>(&FactoryContext::new(), descriptor.short_name())
    }

    /// Build a generator for the member `member` of type `T`.
    pub fn resolve<T: 'static>(&self, context: &FactoryContext, member: &str) -> Result<Gen<T>> {
        let descriptor = TypeDescriptor::of::<T>();
        let context = context.enter(descriptor, member)?;

        let strategy = self
            .strategies
            .get(&descriptor.id)
            .ok_or_else(|| LodestarError::NoGenerator {
                type_name: descriptor.name().to_string(),
                path: context.path(),
            })?;

        let erased = match strategy {
            Strategy::Registered(gen) => gen.clone(),
            Strategy::ListOf(build) | Strategy::Constructor(build) => build(self, &context)?,
        };

        erased
            .downcast_ref::<Gen<T>>()
            .cloned()
            .ok_or_else(|| LodestarError::FactoryTypeMismatch {
                type_name: descriptor.name().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Config;
    use crate::property::Property;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Clone)]
    struct Node {
        children: Vec<Node>,
    }

    fn point_factory() -> GenFactory {
        GenFactory::new()
            .register(Gen::int_range(-10, 10))
            .register_constructor(|factory: &GenFactory, context: &FactoryContext| {
                let x = factory.resolve::<i32>(context, "x")?;
                let y = factory.resolve::<i32>(context, "y")?;
                Ok(x.zip(y).map(|(x, y)| Point { x: *x, y: *y }))
            })
            .register_list::<Point>(0, 5)
    }

    #[test]
    fn test_registered_and_constructed_types() {
        let factory = point_factory();
        assert!(factory.supports::<Point>());

        let points = factory.create::<Vec<Point>>().expect("generator");
        let property = Property::for_all(points, |ps: &Vec<Point>| {
            ps.len() <= 5 && ps.iter().all(|p| p.x.abs() <= 10 && p.y.abs() <= 10)
        });
        assert!(property.check(&Config::default().with_seed(3)).expect("report").passed);
    }

    #[test]
    fn test_missing_generator() {
        let factory = GenFactory::new().register_constructor(|factory: &GenFactory, context: &FactoryContext| {
            let x = factory.resolve::<i32>(context, "x")?;
            Ok(x.map(|x| Point { x: *x, y: 0 }))
        });

        match factory.create::<Point>() {
            Err(LodestarError::NoGenerator { type_name, path }) => {
                assert_eq!(type_name, "i32");
                assert_eq!(path, "Point.x");
            }
            Err(other) => panic!("Expected missing generator, got: {other:?}"),
            Ok(_) => panic!("Expected missing generator, got a generator"),
        }
    }

    #[test]
    fn test_circular_reference() {
        let factory = GenFactory::new()
            .register_list::<Node>(0, 3)
            .register_constructor(|factory: &GenFactory, context: &FactoryContext| {
                let children = factory.resolve::<Vec<Node>>(context, "children")?;
                Ok(children.map(|children| Node {
                    children: children.clone(),
                }))
            });

        match factory.create::<Node>() {
            Err(LodestarError::CircularReference { type_name, path }) => {
                assert!(type_name.ends_with("Node"));
                assert_eq!(path, "Node.children.element");
            }
            Err(other) => panic!("Expected circular reference, got: {other:?}"),
            Ok(_) => panic!("Expected circular reference, got a generator"),
        }
    }

    #[test]
    fn test_short_names() {
        assert_eq!(TypeDescriptor::of::<Vec<Point>>().short_name(), "Vec");
        assert_eq!(TypeDescriptor::of::<Point>().short_name(), "Point");
        assert_eq!(TypeDescriptor::of::<u8>().short_name(), "u8");
    }
}
