//! Property definitions for property-based testing.

use crate::check::{self, CheckReport};
use crate::data::Config;
use crate::error::Result;
use crate::gen::Gen;
use crate::space::panic_message;
use std::cell::OnceCell;
use std::fmt::{self, Debug, Display};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// Outcome of running a test against one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Succeeded,
    /// The predicate returned false, returned an error or panicked.
    Failed { exception: Option<String> },
    /// The input did not satisfy the property's precondition.
    PreconditionFailed,
}

impl TestOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TestOutcome::Failed { .. })
    }
}

/// Values a predicate may return.
pub trait IntoOutcome {
    fn into_outcome(self) -> TestOutcome;
}

impl IntoOutcome for bool {
    fn into_outcome(self) -> TestOutcome {
        if self {
            TestOutcome::Succeeded
        } else {
            TestOutcome::Failed { exception: None }
        }
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> TestOutcome {
        TestOutcome::Succeeded
    }
}

impl<E: Display> IntoOutcome for std::result::Result<(), E> {
    fn into_outcome(self) -> TestOutcome {
        match self {
            Ok(()) => TestOutcome::Succeeded,
            Err(error) => TestOutcome::Failed {
                exception: Some(error.to_string()),
            },
        }
    }
}

impl IntoOutcome for TestOutcome {
    fn into_outcome(self) -> TestOutcome {
        self
    }
}

type TestFn<T> = Rc<dyn Fn(&T) -> TestOutcome>;
type PresentFn<T> = Rc<dyn Fn(&T) -> Vec<String>>;

/// An input bundled with its lazily evaluated outcome.
///
/// The predicate runs at most once per test, the first time the outcome is
/// requested. Clones share the outcome.
pub struct Test<T> {
    input: T,
    outcome: Rc<OnceCell<TestOutcome>>,
    evaluate: TestFn<T>,
    present: PresentFn<T>,
}

impl<T: Clone> Clone for Test<T> {
    fn clone(&self) -> Self {
        Test {
            input: self.input.clone(),
            outcome: self.outcome.clone(),
            evaluate: self.evaluate.clone(),
            present: self.present.clone(),
        }
    }
}

impl<T: Debug> Debug for Test<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Test")
            .field("input", &self.input)
            .field("outcome", &self.outcome.get())
            .finish()
    }
}

impl<T> Test<T> {
    pub fn input(&self) -> &T {
        &self.input
    }

    /// Evaluate the test, or return the outcome of an earlier evaluation.
    ///
    /// A panic inside the predicate becomes a failure carrying the panic
    /// message.
    pub fn outcome(&self) -> &TestOutcome {
        self.outcome.get_or_init(|| {
            match catch_unwind(AssertUnwindSafe(|| (self.evaluate)(&self.input))) {
                Ok(outcome) => outcome,
                Err(payload) => TestOutcome::Failed {
                    exception: Some(panic_message(payload.as_ref())),
                },
            }
        })
    }

    /// The input values as shown in a failure report.
    pub fn present(&self) -> Vec<String> {
        (self.present)(&self.input)
    }
}

/// A property that can be tested with generated inputs.
pub struct Property<T> {
    generator: Gen<T>,
    test: TestFn<T>,
    present: PresentFn<T>,
    name: Option<String>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Property {
            generator: self.generator.clone(),
            test: self.test.clone(),
            present: self.present.clone(),
            name: self.name.clone(),
        }
    }
}

impl<T> Property<T>
where
    T: 'static + Debug + Clone,
{
    /// Create a property that holds when `condition` succeeds for every
    /// generated value.
    pub fn for_all<R, F>(generator: Gen<T>, condition: F) -> Self
    where
        R: IntoOutcome,
        F: Fn(&T) -> R + 'static,
    {
        Property {
            generator,
            test: Rc::new(move |input: &T| condition(input).into_outcome()),
            present: Rc::new(|input: &T| vec![format!("{input:?}")]),
            name: None,
        }
    }

    /// Only test inputs satisfying `precondition`; the others are discarded.
    pub fn precondition<P>(self, precondition: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        let test = self.test.clone();
        Property {
            test: Rc::new(move |input: &T| {
                if precondition(input) {
                    test(input)
                } else {
                    TestOutcome::PreconditionFailed
                }
            }),
            ..self
        }
    }

    /// Name the property in reports.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The generator of tests driven by the check loop.
    ///
    /// Tests whose precondition fails are filtered out, so they surface as
    /// discards.
    pub fn to_gen(&self) -> Gen<Test<T>> {
        let (test, present) = (self.test.clone(), self.present.clone());
        self.generator
            .clone()
            .map(move |input| Test {
                input: input.clone(),
                outcome: Rc::new(OnceCell::new()),
                evaluate: test.clone(),
                present: present.clone(),
            })
            .filter(|test| *test.outcome() != TestOutcome::PreconditionFailed)
    }

    /// Run the property.
    pub fn check(&self, config: &Config) -> Result<CheckReport<T>> {
        check::check(self, config)
    }
}

impl Property<()> {
    /// A property without generated inputs.
    pub fn nullary<R, F>(condition: F) -> Self
    where
        R: IntoOutcome,
        F: Fn() -> R + 'static,
    {
        Property::for_all(Gen::constant(()), move |_: &()| condition())
    }
}

impl<A, B> Property<(A, B)>
where
    A: 'static + Debug + Clone,
    B: 'static + Debug + Clone,
{
    pub fn for_all2<R, F>(a: Gen<A>, b: Gen<B>, condition: F) -> Self
    where
        R: IntoOutcome,
        F: Fn(&A, &B) -> R + 'static,
    {
        let mut property = Property::for_all(Gen::tuple_of2(a, b), move |input: &(A, B)| {
            condition(&input.0, &input.1)
        });
        property.present = Rc::new(|input: &(A, B)| vec![format!("{:?}", input.0), format!("{:?}", input.1)]);
        property
    }
}

impl<A, B, C> Property<(A, B, C)>
where
    A: 'static + Debug + Clone,
    B: 'static + Debug + Clone,
    C: 'static + Debug + Clone,
{
    pub fn for_all3<R, F>(a: Gen<A>, b: Gen<B>, c: Gen<C>, condition: F) -> Self
    where
        R: IntoOutcome,
        F: Fn(&A, &B, &C) -> R + 'static,
    {
        let mut property = Property::for_all(Gen::tuple_of3(a, b, c), move |input: &(A, B, C)| {
            condition(&input.0, &input.1, &input.2)
        });
        property.present = Rc::new(|input: &(A, B, C)| {
            vec![
                format!("{:?}", input.0),
                format!("{:?}", input.1),
                format!("{:?}", input.2),
            ]
        });
        property
    }
}

/// Create a property that checks a condition for every generated value.
pub fn for_all<T, R, F>(generator: Gen<T>, condition: F) -> Property<T>
where
    T: 'static + Debug + Clone,
    R: IntoOutcome,
    F: Fn(&T) -> R + 'static,
{
    Property::for_all(generator, condition)
}
