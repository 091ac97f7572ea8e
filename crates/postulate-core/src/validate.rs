use std::collections::HashSet;

use postulate_model::signature::{Annotation, Param};

use crate::class::TheoryClass;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Duplicate test method '{method}'")]
    DuplicateMethod { method: String },

    #[error("Duplicate data point '{name}'")]
    DuplicateDataPoint { name: String },

    #[error("Unknown supplier: parameter '{parameter}' of '{owner}' is supplied by '{supplier}' which is not registered")]
    UnknownSupplier {
        owner: String,
        parameter: String,
        supplier: String,
    },

    #[error("Unknown group: parameter '{parameter}' of '{owner}' draws from group '{group}' which no data point declares")]
    UnknownGroup {
        owner: String,
        parameter: String,
        group: String,
    },

    #[error("Plain test '{method}' declares {count} parameter(s); declare it as a theory")]
    ParametersOnPlainTest { method: String, count: usize },

    #[error("Conflicting sources: parameter '{parameter}' of '{owner}' is both supplied by a supplier and tested on fixed values")]
    ConflictingSources { owner: String, parameter: String },
}

/// Check a class before anything runs, collecting every problem at once.
pub fn validate_class<T>(class: &TheoryClass<T>) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    validate_method_names(class, &mut errors);
    validate_data_point_names(class, &mut errors);
    validate_plain_tests(class, &mut errors);

    let constructor_owner = format!("{}::new", class.name());
    validate_params(class, &constructor_owner, class.constructor_params(), &mut errors);
    for method in class.methods() {
        validate_params(class, method.name(), method.params(), &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_method_names<T>(class: &TheoryClass<T>, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for method in class.methods() {
        if !seen.insert(method.name()) {
            errors.push(ValidationError::DuplicateMethod {
                method: method.name().to_string(),
            });
        }
    }
}

fn validate_data_point_names<T>(class: &TheoryClass<T>, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for data_point in class.context().data_points() {
        if !seen.insert(data_point.name.as_str()) {
            errors.push(ValidationError::DuplicateDataPoint {
                name: data_point.name.clone(),
            });
        }
    }
}

fn validate_plain_tests<T>(class: &TheoryClass<T>, errors: &mut Vec<ValidationError>) {
    for method in class.methods() {
        if !method.is_theory() && !method.params().is_empty() {
            errors.push(ValidationError::ParametersOnPlainTest {
                method: method.name().to_string(),
                count: method.params().len(),
            });
        }
    }
}

/// Check every annotation on a parameter list resolves against the class context.
fn validate_params<T>(
    class: &TheoryClass<T>,
    owner: &str,
    params: &[Param],
    errors: &mut Vec<ValidationError>,
) {
    let context = class.context();
    for (index, param) in params.iter().enumerate() {
        let parameter = param.name.clone().unwrap_or_else(|| format!("arg{index}"));
        let mut supplied = false;
        let mut tested_on = false;
        for annotation in &param.annotations {
            match annotation {
                Annotation::SuppliedBy(supplier) => {
                    supplied = true;
                    if !context.has_supplier(supplier) {
                        errors.push(ValidationError::UnknownSupplier {
                            owner: owner.to_string(),
                            parameter: parameter.clone(),
                            supplier: supplier.clone(),
                        });
                    }
                }
                Annotation::FromDataPoints(group) => {
                    if !context.declares_group(group) {
                        errors.push(ValidationError::UnknownGroup {
                            owner: owner.to_string(),
                            parameter: parameter.clone(),
                            group: group.clone(),
                        });
                    }
                }
                Annotation::TestedOn(_) => tested_on = true,
            }
        }
        if supplied && tested_on {
            errors.push(ValidationError::ConflictingSources {
                owner: owner.to_string(),
                parameter,
            });
        }
    }
}
