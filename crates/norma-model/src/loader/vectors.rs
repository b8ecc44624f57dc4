//! Decoder for the solver's plain-text model dump.
//!
//! ```text
//! # Final results
//! # ZDD 0: core_lease
//! # Magic: 4412
//! # Arrays: 3
//! [1, 2, 5]
//! [1, 3]
//! # ZDD 1: solar_addendum
//! [7, 8]
//! ```
//!
//! Every bracketed line is a model. A `# ZDD <n>: <name>` header opens a new
//! partition; `# Magic:` and `# Arrays:` annotate the open partition.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::ModelError;
use crate::model::{Model, Team};
use crate::partition::DomainPartition;
use crate::predicate::PredicateId;

/// Decoded contents of a vector dump.
#[derive(Debug, Clone, Default)]
pub struct VectorFile {
    pub team: Team,
    pub partitions: Vec<DomainPartition>,
    /// Bracketed lines that could not be decoded.
    pub skipped_lines: usize,
}

#[derive(Debug)]
struct OpenPartition {
    name: String,
    magic: Option<u64>,
    arrays: Option<u64>,
    models: Vec<Model>,
}

impl OpenPartition {
    fn close(self, out: &mut Vec<DomainPartition>) {
        if self.models.is_empty() {
            debug!("dropping partition '{}' with no models", self.name);
            return;
        }
        out.push(
            DomainPartition::new(self.name, Team::from_models(self.models))
                .with_header(self.magic, self.arrays),
        );
    }
}

fn header_value(line: &str) -> Option<u64> {
    line.split_once(':')
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Decode the ids inside the first `[...]` on a line.
///
/// Returns `Ok(None)` when the line has no bracketed vector.
pub fn parse_vector_line(line: &str) -> Result<Option<Model>, String> {
    let Some(open) = line.find('[') else {
        return Ok(None);
    };
    let Some(close_rel) = line[open + 1..].find(']') else {
        return Ok(None);
    };
    let body = &line[open + 1..open + 1 + close_rel];
    let mut ids = Vec::new();
    for token in body.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let id: PredicateId = token
            .parse()
            .map_err(|_| format!("'{token}' is not a predicate id"))?;
        ids.push(id);
    }
    Ok(Some(Model::new(ids)))
}

/// Decode a vector dump, stopping after `max_models` models when given.
pub fn parse_vectors(source: &str, max_models: Option<usize>) -> VectorFile {
    let mut file = VectorFile::default();
    let mut open: Option<OpenPartition> = None;

    for (index, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            if line.starts_with("# ZDD ") {
                if let Some((_, name)) = line.split_once(':') {
                    if let Some(previous) = open.take() {
                        previous.close(&mut file.partitions);
                    }
                    open = Some(OpenPartition {
                        name: name.trim().to_string(),
                        magic: None,
                        arrays: None,
                        models: Vec::new(),
                    });
                }
            } else if line.starts_with("# Magic:") {
                if let Some(current) = open.as_mut() {
                    current.magic = header_value(line);
                }
            } else if line.starts_with("# Arrays:") {
                if let Some(current) = open.as_mut() {
                    current.arrays = header_value(line);
                }
            }
            continue;
        }

        match parse_vector_line(line) {
            Ok(Some(model)) => {
                if let Some(current) = open.as_mut() {
                    current.models.push(model.clone());
                }
                file.team.push(model);
                if max_models.is_some_and(|max| file.team.len() >= max) {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => {
                warn!("line {}: skipping vector: {message}", index + 1);
                file.skipped_lines += 1;
            }
        }
    }

    if let Some(last) = open.take() {
        last.close(&mut file.partitions);
    }
    file
}

/// Load a vector dump from disk.
pub fn load_vectors(path: &Path, max_models: Option<usize>) -> Result<VectorFile, ModelError> {
    let source = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_vectors(&source, max_models);
    info!(
        "Loaded {} models in {} partitions from {}",
        file.team.len(),
        file.partitions.len(),
        path.display()
    );
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
# Final results
# ZDD 0: core_lease
# Magic: 4412
# Arrays: 3
[1, 2, 5]
[1, 3]

# ZDD 1: solar_addendum
# Arrays: not-a-number
Vector: [7, 8]
[7, x]
# ZDD 2: never_satisfied
";

    #[test]
    fn test_parse_vectors_groups_partitions() {
        let file = parse_vectors(DUMP, None);
        assert_eq!(file.team.len(), 3);
        assert_eq!(file.skipped_lines, 1);
        assert_eq!(file.partitions.len(), 2, "empty partition is dropped");

        let core = &file.partitions[0];
        assert_eq!(core.name, "core_lease");
        assert_eq!(core.magic, Some(4412));
        assert_eq!(core.arrays, Some(3));
        assert_eq!(core.models().len(), 2);

        let solar = &file.partitions[1];
        assert_eq!(solar.name, "solar_addendum");
        assert_eq!(solar.arrays, None);
        assert_eq!(solar.models(), &[Model::new([7, 8])]);
    }

    #[test]
    fn test_parse_vectors_respects_cap() {
        let file = parse_vectors(DUMP, Some(2));
        assert_eq!(file.team.len(), 2);
        assert_eq!(file.partitions.len(), 1);
    }

    #[test]
    fn test_parse_vector_line_variants() {
        assert_eq!(parse_vector_line("[]").unwrap(), Some(Model::new([])));
        assert_eq!(parse_vector_line("[ 3 ,1, ]").unwrap(), Some(Model::new([1, 3])));
        assert_eq!(parse_vector_line("no vector here").unwrap(), None);
        assert_eq!(parse_vector_line("[1, 2").unwrap(), None);
        assert!(parse_vector_line("[1, -2]").is_err());
    }

    #[test]
    fn test_vectors_without_headers_form_no_partitions() {
        let file = parse_vectors("[1]\n[2]\n", None);
        assert_eq!(file.team.len(), 2);
        assert!(file.partitions.is_empty());
    }
}
