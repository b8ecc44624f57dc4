use miette::Diagnostic;
use norma_model::{Model, PredicateId};
use thiserror::Error;

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum AnalysisError {
    #[error("predicate {id} is not defined in the catalog")]
    #[diagnostic(
        code(norma::analysis::predicate_not_found),
        help("list the catalog with `norma predicates` to find valid ids")
    )]
    PredicateNotFound { id: PredicateId },

    #[error("no predicate named '{name}' in the catalog")]
    #[diagnostic(code(norma::analysis::predicate_name_not_found))]
    PredicateNameNotFound { name: String },

    #[error("split of {id1} and {id2} is undefined: model #{index} {model} contains neither")]
    #[diagnostic(
        code(norma::analysis::undefined_split),
        help("a split is only defined when every model contains at least one of the two ids")
    )]
    UndefinedSplit {
        id1: PredicateId,
        id2: PredicateId,
        index: usize,
        model: Model,
    },

    #[error("invalid query path '{input}': {message}")]
    #[diagnostic(
        code(norma::analysis::invalid_path),
        help("use the form [1,-2,3]: positive ids are required, negative ids are forbidden")
    )]
    InvalidPath { input: String, message: String },
}
