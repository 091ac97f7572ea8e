//! Static registration of test classes: fixture construction, data points,
//! named suppliers, plain tests and theories.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use postulate_explore::data_point::DataPoint;
use postulate_explore::supplier::SupplierContext;
use postulate_model::failure::TheoryResult;
use postulate_model::signature::{Param, ParameterSignature};
use postulate_model::supplier::ParameterSupplier;
use postulate_model::value::Value;

pub type Factory<T> = dyn Fn(&[Value]) -> TheoryResult<T> + Send + Sync;
pub type Body<T> = dyn Fn(&T, &[Value]) -> TheoryResult + Send + Sync;
pub type Hook<T> = dyn Fn(&T) -> TheoryResult + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// A plain test: no parameters, runs once.
    Test,
    Theory { nulls_accepted: bool },
}

pub struct TestMethod<T> {
    name: String,
    kind: MethodKind,
    params: Vec<Param>,
    body: Arc<Body<T>>,
}

impl<T> TestMethod<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn is_theory(&self) -> bool {
        matches!(self.kind, MethodKind::Theory { .. })
    }

    /// Plain tests never accept nulls.
    pub fn nulls_accepted(&self) -> bool {
        matches!(self.kind, MethodKind::Theory { nulls_accepted: true })
    }

    pub fn signatures(&self) -> Vec<ParameterSignature> {
        ParameterSignature::signatures(&self.params, self.nulls_accepted())
    }

    pub fn invoke(&self, fixture: &T, args: &[Value]) -> TheoryResult {
        (self.body)(fixture, args)
    }
}

impl<T> fmt::Debug for TestMethod<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestMethod")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A test class over fixture type `T`.
///
/// Every invocation builds a fresh fixture from the constructor arguments
/// bound for it.
pub struct TheoryClass<T> {
    name: String,
    constructor_params: Vec<Param>,
    factory: Arc<Factory<T>>,
    before_each: Option<Arc<Hook<T>>>,
    after_each: Option<Arc<Hook<T>>>,
    context: Arc<SupplierContext>,
    methods: Vec<Arc<TestMethod<T>>>,
}

impl<T: Default + 'static> TheoryClass<T> {
    /// A class whose fixture is default-constructed.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_constructor(name, Vec::new(), |_: &[Value]| Ok(T::default()))
    }
}

impl<T: 'static> TheoryClass<T> {
    /// A class whose fixture constructor takes parameters; they are bound
    /// from candidates like theory parameters, ahead of the method's own.
    pub fn with_constructor<F>(name: impl Into<String>, params: Vec<Param>, factory: F) -> Self
    where
        F: Fn(&[Value]) -> TheoryResult<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor_params: params,
            factory: Arc::new(factory),
            before_each: None,
            after_each: None,
            context: Arc::new(SupplierContext::new()),
            methods: Vec::new(),
        }
    }

    pub fn data_point(mut self, data_point: DataPoint) -> Self {
        Arc::make_mut(&mut self.context).add_data_point(data_point);
        self
    }

    pub fn supplier(mut self, name: impl Into<String>, supplier: impl ParameterSupplier + 'static) -> Self {
        Arc::make_mut(&mut self.context).register_supplier(name, supplier);
        self
    }

    /// Runs on the fresh fixture before the body.
    pub fn before_each<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) -> TheoryResult + Send + Sync + 'static,
    {
        self.before_each = Some(Arc::new(hook));
        self
    }

    /// Runs after the body, even when the body failed.
    pub fn after_each<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) -> TheoryResult + Send + Sync + 'static,
    {
        self.after_each = Some(Arc::new(hook));
        self
    }

    pub fn test<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&T) -> TheoryResult + Send + Sync + 'static,
    {
        self.method(name, MethodKind::Test, Vec::new(), move |fixture: &T, _: &[Value]| body(fixture))
    }

    pub fn theory<F>(self, name: impl Into<String>, params: Vec<Param>, body: F) -> Self
    where
        F: Fn(&T, &[Value]) -> TheoryResult + Send + Sync + 'static,
    {
        self.method(name, MethodKind::Theory { nulls_accepted: false }, params, body)
    }

    pub fn theory_accepting_nulls<F>(self, name: impl Into<String>, params: Vec<Param>, body: F) -> Self
    where
        F: Fn(&T, &[Value]) -> TheoryResult + Send + Sync + 'static,
    {
        self.method(name, MethodKind::Theory { nulls_accepted: true }, params, body)
    }

    /// Register a method of any kind. Plain tests declaring parameters are
    /// rejected at validation.
    pub fn method<F>(mut self, name: impl Into<String>, kind: MethodKind, params: Vec<Param>, body: F) -> Self
    where
        F: Fn(&T, &[Value]) -> TheoryResult + Send + Sync + 'static,
    {
        self.methods.push(Arc::new(TestMethod {
            name: name.into(),
            kind,
            params,
            body: Arc::new(body),
        }));
        self
    }
}

impl<T> TheoryClass<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructor_params(&self) -> &[Param] {
        &self.constructor_params
    }

    pub fn constructor_signatures(&self) -> Vec<ParameterSignature> {
        ParameterSignature::signatures(&self.constructor_params, false)
    }

    pub fn context(&self) -> &Arc<SupplierContext> {
        &self.context
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> &[Arc<TestMethod<T>>] {
        &self.methods
    }

    pub fn construct(&self, args: &[Value]) -> TheoryResult<T> {
        (self.factory)(args)
    }

    pub(crate) fn before_hook(&self) -> Option<&Hook<T>> {
        self.before_each.as_deref()
    }

    pub(crate) fn after_hook(&self) -> Option<&Hook<T>> {
        self.after_each.as_deref()
    }
}

impl<T> fmt::Debug for TheoryClass<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TheoryClass")
            .field("name", &self.name)
            .field("constructor_params", &self.constructor_params)
            .field("context", &self.context)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}
