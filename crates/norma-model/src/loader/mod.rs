//! Decoders for the compiler/solver outputs consumed by the analysis engine.

pub mod solver;
pub mod vectors;

pub use solver::{load_cascade, load_results, parse_results, CascadeExecution, CascadeMetadata};
pub use vectors::{load_vectors, parse_vector_line, parse_vectors, VectorFile};
