use std::fmt;

use crate::value::Value;

/// Declared type of a theory parameter or data point.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    /// Accepts every candidate.
    Any,
    Bool,
    Int,
    Float,
    Str,
    List(Box<ParamType>),
    /// A closed set of variants. Compatibility is decided by name.
    Enum { name: String, variants: Vec<String> },
    /// An opaque host type, matched by name.
    Named(String),
}

impl ParamType {
    pub fn enumeration<S: Into<String>>(name: impl Into<String>, variants: Vec<S>) -> Self {
        ParamType::Enum {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn list(element: ParamType) -> Self {
        ParamType::List(Box::new(element))
    }

    /// Whether a candidate declared as `other` may be bound where `self` is expected.
    pub fn is_assignable_from(&self, other: &ParamType) -> bool {
        match (self, other) {
            (ParamType::Any, _) => true,
            (ParamType::List(a), ParamType::List(b)) => a.is_assignable_from(b),
            (ParamType::Enum { name: a, .. }, ParamType::Enum { name: b, .. }) => a == b,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Any => write!(f, "any"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Int => write!(f, "int"),
            ParamType::Float => write!(f, "float"),
            ParamType::Str => write!(f, "str"),
            ParamType::List(element) => write!(f, "list<{element}>"),
            ParamType::Enum { name, .. } => write!(f, "{name}"),
            ParamType::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Metadata attached to a parameter that steers candidate lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Only data points declared in this group are candidates.
    FromDataPoints(String),
    /// Candidates come from the named registered supplier.
    SuppliedBy(String),
    /// Candidates are exactly these integers.
    TestedOn(Vec<i64>),
}

/// A parameter as declared on a theory or fixture constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub param_type: ParamType,
    pub annotations: Vec<Annotation>,
}

impl Param {
    pub fn new(param_type: ParamType) -> Self {
        Self {
            name: None,
            param_type,
            annotations: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn from_data_points(mut self, group: impl Into<String>) -> Self {
        self.annotations.push(Annotation::FromDataPoints(group.into()));
        self
    }

    pub fn supplied_by(mut self, supplier: impl Into<String>) -> Self {
        self.annotations.push(Annotation::SuppliedBy(supplier.into()));
        self
    }

    pub fn tested_on(mut self, ints: Vec<i64>) -> Self {
        self.annotations.push(Annotation::TestedOn(ints));
        self
    }
}

/// Immutable description of one formal parameter, computed once per
/// method (or constructor) before any assignment is attempted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSignature {
    /// Ordinal position within its parameter list.
    pub index: usize,
    pub name: Option<String>,
    pub param_type: ParamType,
    /// Derived from the enclosing theory's null policy.
    pub nulls_accepted: bool,
    pub annotations: Vec<Annotation>,
}

impl ParameterSignature {
    /// Derive the ordered signatures of a parameter list.
    pub fn signatures(params: &[Param], nulls_accepted: bool) -> Vec<ParameterSignature> {
        params
            .iter()
            .enumerate()
            .map(|(index, param)| ParameterSignature {
                index,
                name: param.name.clone(),
                param_type: param.param_type.clone(),
                nulls_accepted,
                annotations: param.annotations.clone(),
            })
            .collect()
    }

    pub fn can_accept_type(&self, candidate: &ParamType) -> bool {
        self.param_type.is_assignable_from(candidate)
    }

    /// Null is compatible with every type; the null policy is enforced at execution.
    pub fn can_accept_value(&self, value: &Value) -> bool {
        value.is_null() || self.can_accept_type(&value.param_type())
    }

    pub fn supplier_name(&self) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::SuppliedBy(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn data_point_group(&self) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::FromDataPoints(group) => Some(group.as_str()),
            _ => None,
        })
    }

    pub fn tested_on(&self) -> Option<&[i64]> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::TestedOn(ints) => Some(ints.as_slice()),
            _ => None,
        })
    }

    /// Label used in diagnostics: the declared name, or `arg<index>`.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("arg{}", self.index),
        }
    }
}
