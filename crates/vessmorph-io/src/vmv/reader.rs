// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::builder::SectionBuilder;
use crate::factory::{morphology_name, read_text, MorphologyLoader};
use crate::options::LoadOptions;
use std::path::Path;
use tracing::debug;
use vessmorph_structures::{Morphology, MorphologyError, MorphologyResult, Sample, TaskControl, Vec3};

/// Reader for `.vmv` files.
///
/// Each strand becomes one section whose samples carry the vertex index, so
/// strands sharing a terminal vertex are linked as parent and child.
#[derive(Debug, Clone, Copy, Default)]
pub struct VmvReader {
    options: LoadOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Outside,
    Params,
    Vertices,
    Strands,
}

#[derive(Debug, Default)]
struct Declared {
    vertices: Option<usize>,
    strands: Option<usize>,
}

impl VmvReader {
    pub fn new(options: LoadOptions) -> Self {
        VmvReader { options }
    }

    /// Parses VMV text.
    ///
    /// # Errors
    /// [`MorphologyError::Parse`] for an unknown block marker, a short vertex
    /// line, non-contiguous vertex indices, a reference outside the vertex
    /// list, an empty strand or counts that differ from the declared ones.
    pub fn parse_str(&self, name: &str, text: &str, control: &TaskControl) -> MorphologyResult<Morphology> {
        let mut block = Block::Outside;
        let mut declared = Declared::default();
        let mut vertices: Vec<(Vec3, f32)> = Vec::new();
        let mut strands: Vec<(usize, Vec<usize>)> = Vec::new();

        for (number, line) in text.lines().enumerate() {
            let line_number = number + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('$') {
                block = next_block(block, trimmed, line_number)?;
                continue;
            }
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            match block {
                Block::Params => read_param(&tokens, &mut declared, line_number)?,
                Block::Vertices => {
                    let (index, point, radius) = read_vertex(&tokens, line_number)?;
                    if index != vertices.len() + 1 {
                        return Err(MorphologyError::parse_at(
                            line_number,
                            1,
                            format!("vertex {} out of sequence, expected {}", index, vertices.len() + 1),
                        ));
                    }
                    vertices.push((point, radius));
                }
                Block::Strands => {
                    control.checkpoint()?;
                    strands.push(read_strand(&tokens, line_number)?);
                }
                Block::Outside => {
                    return Err(MorphologyError::parse(
                        line_number,
                        format!("'{}' outside any block", trimmed),
                    ));
                }
            }
        }
        let last_line = text.lines().count();
        if block != Block::Outside {
            return Err(MorphologyError::parse(last_line, "unterminated block"));
        }
        check_count(NUM_VERTS, declared.vertices, vertices.len(), last_line)?;
        check_count(NUM_STRANDS, declared.strands, strands.len(), last_line)?;

        let mut builder = SectionBuilder::new(name);
        for (strand, references) in &strands {
            let mut samples = Vec::with_capacity(references.len());
            for &vertex in references {
                let Some(&(point, radius)) = vertex.checked_sub(1).and_then(|i| vertices.get(i)) else {
                    return Err(MorphologyError::parse(
                        last_line,
                        format!(
                            "strand {} references vertex {} outside 1..={}",
                            strand,
                            vertex,
                            vertices.len()
                        ),
                    ));
                };
                samples.push(Sample::new(point, radius, vertex as i64).with_series_index(vertex - 1));
            }
            builder.push_section(samples);
        }
        debug!(
            target: "vessmorph-io",
            "VMV '{}': {} vertices, {} strands",
            name,
            vertices.len(),
            strands.len()
        );

        let mut morphology = builder.link_by_shared_terminals(control)?;
        morphology.set_loaded_counts(vertices.len(), strands.len());
        self.options.apply(&mut morphology);
        Ok(morphology)
    }
}

impl MorphologyLoader for VmvReader {
    fn format_name(&self) -> &'static str {
        "vmv"
    }

    fn load(&self, path: &Path, control: &TaskControl) -> MorphologyResult<Morphology> {
        let text = read_text(path)?;
        self.parse_str(&morphology_name(path), &text, control)
    }
}

fn next_block(current: Block, marker: &str, line_number: usize) -> MorphologyResult<Block> {
    let (expected, next) = match marker {
        PARAM_BEGIN => (Block::Outside, Block::Params),
        VERT_LIST_BEGIN => (Block::Outside, Block::Vertices),
        STRANDS_LIST_BEGIN => (Block::Outside, Block::Strands),
        PARAM_END => (Block::Params, Block::Outside),
        VERT_LIST_END => (Block::Vertices, Block::Outside),
        STRANDS_LIST_END => (Block::Strands, Block::Outside),
        _ => {
            return Err(MorphologyError::parse(
                line_number,
                format!("unknown block marker '{}'", marker),
            ))
        }
    };
    if current != expected {
        return Err(MorphologyError::parse(
            line_number,
            format!("unexpected '{}'", marker),
        ));
    }
    Ok(next)
}

fn read_param(tokens: &[&str], declared: &mut Declared, line_number: usize) -> MorphologyResult<()> {
    let [key, value] = tokens else {
        return Err(MorphologyError::parse(line_number, "parameter lines are 'NAME value'"));
    };
    let value: usize = value.parse().map_err(|_| {
        MorphologyError::parse_at(line_number, 2, format!("'{}' is not a count", value))
    })?;
    match *key {
        NUM_VERTS => declared.vertices = Some(value),
        NUM_STRANDS => declared.strands = Some(value),
        NUM_ATTRIB_PER_VERT if value < 4 => {
            return Err(MorphologyError::parse_at(
                line_number,
                2,
                format!("{} attributes per vertex, at least 4 needed", value),
            ))
        }
        // Unknown parameters are carried by some writers; skip them.
        _ => {}
    }
    Ok(())
}

fn read_vertex(tokens: &[&str], line_number: usize) -> MorphologyResult<(usize, Vec3, f32)> {
    if tokens.len() < 5 {
        return Err(MorphologyError::parse(
            line_number,
            format!("vertex lines need 5 values, found {}", tokens.len()),
        ));
    }
    let index: usize = tokens[0].parse().map_err(|_| {
        MorphologyError::parse_at(line_number, 1, format!("'{}' is not a vertex index", tokens[0]))
    })?;
    let mut values = [0f32; 4];
    for (column, value) in values.iter_mut().enumerate() {
        let token = tokens[column + 1];
        *value = token.parse().map_err(|_| {
            MorphologyError::parse_at(line_number, column + 2, format!("'{}' is not a number", token))
        })?;
    }
    Ok((index, Vec3::new(values[0], values[1], values[2]), values[3]))
}

fn read_strand(tokens: &[&str], line_number: usize) -> MorphologyResult<(usize, Vec<usize>)> {
    let parse = |column: usize| -> MorphologyResult<usize> {
        tokens[column].parse().map_err(|_| {
            MorphologyError::parse_at(
                line_number,
                column + 1,
                format!("'{}' is not an index", tokens[column]),
            )
        })
    };
    let strand = parse(0)?;
    if tokens.len() < 2 {
        return Err(MorphologyError::parse(
            line_number,
            format!("strand {} has no vertices", strand),
        ));
    }
    let references = (1..tokens.len()).map(parse).collect::<MorphologyResult<Vec<_>>>()?;
    Ok((strand, references))
}

fn check_count(what: &str, declared: Option<usize>, found: usize, line_number: usize) -> MorphologyResult<()> {
    match declared {
        Some(declared) if declared != found => Err(MorphologyError::parse(
            line_number,
            format!("{} declares {} but {} were listed", what, declared, found),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORK: &str = "$PARAM_BEGIN
NUM_VERTS   4
NUM_STRANDS 2
NUM_ATTRIB_PER_VERT 4
$PARAM_END

$VERT_LIST_BEGIN
1\t0.00\t0.00\t0.00\t1.00
2\t1.00\t0.00\t0.00\t1.00
3\t2.00  1.00 0.00\t0.50\t7.5
4\t2.00\t-1.00\t0.00\t0.50
$VERT_LIST_END

$STRANDS_LIST_BEGIN
0 1 2
1 2 3
$STRANDS_LIST_END
";

    fn parse(text: &str) -> MorphologyResult<Morphology> {
        VmvReader::default().parse_str("vmv", text, &TaskControl::none())
    }

    #[test]
    fn test_reads_blocks_and_links_strands() {
        let morphology = parse(FORK).unwrap();
        assert_eq!(morphology.number_sections(), 2);
        assert_eq!(morphology.roots(), &[0]);
        assert_eq!(morphology.sections()[0].children, vec![1]);
        let tip = morphology.sections()[1].samples[1];
        assert_eq!(tip.index, 3);
        assert_eq!(tip.point, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(tip.radius, 0.5);
        assert_eq!(morphology.number_samples_as_loaded(), 4);
    }

    #[test]
    fn test_count_mismatch() {
        let text = FORK.replace("NUM_STRANDS 2", "NUM_STRANDS 3");
        assert!(matches!(parse(&text), Err(MorphologyError::Parse { .. })));
        let text = FORK.replace("NUM_VERTS   4", "NUM_VERTS   5");
        assert!(parse(&text).is_err());
    }

    #[test]
    fn test_reference_errors() {
        let out_of_range = FORK.replace("1 2 3\n", "1 2 9\n");
        assert!(matches!(parse(&out_of_range), Err(MorphologyError::Parse { .. })));
        let zero = FORK.replace("0 1 2\n", "0 0 2\n");
        assert!(parse(&zero).is_err());
        let empty = FORK.replace("1 2 3\n", "1\n");
        assert!(parse(&empty).is_err());
    }

    #[test]
    fn test_vertex_errors() {
        let gap = FORK.replace("4\t2.00\t-1.00", "5\t2.00\t-1.00");
        assert!(matches!(parse(&gap), Err(MorphologyError::Parse { line: 11, .. })));
        let short = FORK.replace("4\t2.00\t-1.00\t0.00\t0.50", "4\t2.00\t-1.00");
        assert!(parse(&short).is_err());
        let unterminated = FORK.replace("$STRANDS_LIST_END\n", "");
        assert!(parse(&unterminated).is_err());
        let stray = format!("garbage\n{}", FORK);
        assert!(matches!(parse(&stray), Err(MorphologyError::Parse { line: 1, .. })));
    }
}
