// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
MATLAB level-5 MAT-files (saved with `-v6` or the default `-v7`).

A level-5 file is a 128-byte header followed by tagged data elements. Every
variable is an `miMATRIX` element, optionally wrapped in a zlib-compressed
`miCOMPRESSED` element. Numeric and sparse matrices decode into a
[`MemoryStore`]; cells, structs and strings are skipped.

`-v7.3` files are HDF5 containers and are read through the `hdf5` feature.
*/

use crate::store::{MemoryStore, SparseMatrix};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;
use ndarray::{Array2, ShapeBuilder};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};
use vessmorph_structures::{MorphologyError, MorphologyResult};

const HEADER_LEN: usize = 128;
const LEVEL5_VERSION: u16 = 0x0100;

const MI_INT8: u32 = 1;
const MI_UINT8: u32 = 2;
const MI_INT16: u32 = 3;
const MI_UINT16: u32 = 4;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_SINGLE: u32 = 7;
const MI_DOUBLE: u32 = 9;
const MI_INT64: u32 = 12;
const MI_UINT64: u32 = 13;
const MI_MATRIX: u32 = 14;
const MI_COMPRESSED: u32 = 15;

const MX_SPARSE_CLASS: u32 = 5;
const MX_DOUBLE_CLASS: u32 = 6;
const MX_UINT64_CLASS: u32 = 15;
const COMPLEX_FLAG: u32 = 0x0800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

impl Endian {
    fn read<T>(self, bytes: &[u8], little: fn(&[u8]) -> T, big: fn(&[u8]) -> T) -> T {
        match self {
            Endian::Little => little(bytes),
            Endian::Big => big(bytes),
        }
    }

    fn u32(self, bytes: &[u8]) -> u32 {
        self.read(bytes, LittleEndian::read_u32, BigEndian::read_u32)
    }

    /// Numeric payload of an element of type `kind`, widened to `f64`.
    fn numbers(self, kind: u32, data: &[u8]) -> MorphologyResult<Vec<f64>> {
        let width = match kind {
            MI_INT8 | MI_UINT8 => 1,
            MI_INT16 | MI_UINT16 => 2,
            MI_INT32 | MI_UINT32 | MI_SINGLE => 4,
            MI_DOUBLE | MI_INT64 | MI_UINT64 => 8,
            other => {
                return Err(MorphologyError::format(format!(
                    "MAT data type {} is not numeric",
                    other
                )))
            }
        };
        if data.len() % width != 0 {
            return Err(MorphologyError::format(format!(
                "MAT element of type {} has {} bytes, not a multiple of {}",
                kind,
                data.len(),
                width
            )));
        }
        Ok(data
            .chunks_exact(width)
            .map(|c| match kind {
                MI_INT8 => c[0] as i8 as f64,
                MI_UINT8 => c[0] as f64,
                MI_INT16 => self.read(c, LittleEndian::read_i16, BigEndian::read_i16) as f64,
                MI_UINT16 => self.read(c, LittleEndian::read_u16, BigEndian::read_u16) as f64,
                MI_INT32 => self.read(c, LittleEndian::read_i32, BigEndian::read_i32) as f64,
                MI_UINT32 => self.u32(c) as f64,
                MI_SINGLE => self.read(c, LittleEndian::read_f32, BigEndian::read_f32) as f64,
                MI_INT64 => self.read(c, LittleEndian::read_i64, BigEndian::read_i64) as f64,
                MI_UINT64 => self.read(c, LittleEndian::read_u64, BigEndian::read_u64) as f64,
                _ => self.read(c, LittleEndian::read_f64, BigEndian::read_f64),
            })
            .collect())
    }
}

/// Byte order of a level-5 header; `None` for other files, `-v7.3` included.
fn level5_endian(header: &[u8]) -> Option<Endian> {
    if header.len() < HEADER_LEN {
        return None;
    }
    let endian = match &header[126..128] {
        b"IM" => Endian::Little,
        b"MI" => Endian::Big,
        _ => return None,
    };
    let version = endian.read(&header[124..126], LittleEndian::read_u16, BigEndian::read_u16);
    (version == LEVEL5_VERSION).then_some(endian)
}

/// Whether `header` (the first 128 bytes or more) starts a level-5 MAT-file.
pub fn is_level5(header: &[u8]) -> bool {
    level5_endian(header).is_some()
}

/// Whether the file at `path` is a level-5 MAT-file.
///
/// # Errors
/// [`MorphologyError::Io`] if the file cannot be read.
pub fn has_level5_header(path: &Path) -> MorphologyResult<bool> {
    let file = File::open(path).map_err(|e| MorphologyError::io(path, e))?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .map_err(|e| MorphologyError::io(path, e))?;
    Ok(is_level5(&header))
}

/// Reads the level-5 MAT-file at `path`.
pub fn open_level5(path: &Path) -> MorphologyResult<MemoryStore> {
    let bytes = std::fs::read(path).map_err(|e| MorphologyError::io(path, e))?;
    read_level5(&bytes)
}

/// Decodes the numeric and sparse variables of a level-5 MAT-file.
///
/// # Errors
/// [`MorphologyError::Format`] if the header is not level 5, an element is
/// truncated, a compressed element does not inflate or a matrix payload
/// does not match its dimensions.
pub fn read_level5(bytes: &[u8]) -> MorphologyResult<MemoryStore> {
    let endian = level5_endian(bytes)
        .ok_or_else(|| MorphologyError::format("not a level-5 MAT-file"))?;
    let mut store = MemoryStore::new();
    let mut variables = 0;
    let mut elements = Elements::new(&bytes[HEADER_LEN..], endian);
    while let Some((kind, data)) = elements.next_element()? {
        match kind {
            MI_MATRIX => variables += decode_matrix(data, endian, &mut store)? as usize,
            MI_COMPRESSED => {
                let inflated = inflate(data)?;
                let mut inner = Elements::new(&inflated, endian);
                while let Some((kind, data)) = inner.next_element()? {
                    if kind == MI_MATRIX {
                        variables += decode_matrix(data, endian, &mut store)? as usize;
                    }
                }
            }
            other => debug!(target: "vessmorph-io", "Skipping top-level MAT element of type {}", other),
        }
    }
    debug!(target: "vessmorph-io", "MAT level-5 ({:?} endian): {} variables decoded", endian, variables);
    Ok(store)
}

/// Sequential reader over tagged data elements.
struct Elements<'a> {
    bytes: &'a [u8],
    position: usize,
    endian: Endian,
}

impl<'a> Elements<'a> {
    fn new(bytes: &'a [u8], endian: Endian) -> Self {
        Elements {
            bytes,
            position: 0,
            endian,
        }
    }

    fn next_element(&mut self) -> MorphologyResult<Option<(u32, &'a [u8])>> {
        let rest = &self.bytes[self.position..];
        if rest.is_empty() {
            return Ok(None);
        }
        if rest.len() < 8 {
            return Err(MorphologyError::format(format!(
                "truncated MAT element tag at byte {}",
                self.position
            )));
        }
        let first = self.endian.u32(&rest[0..4]);
        // Small elements pack the byte count into the upper half of the tag.
        let small = first >> 16 != 0;
        let (kind, size, offset) = if small {
            (first & 0xffff, (first >> 16) as usize, 4)
        } else {
            (first, self.endian.u32(&rest[4..8]) as usize, 8)
        };
        if small && size > 4 {
            return Err(MorphologyError::format(format!(
                "small MAT element at byte {} claims {} bytes",
                self.position, size
            )));
        }
        let end = offset + size;
        if rest.len() < end {
            return Err(MorphologyError::format(format!(
                "MAT element at byte {} needs {} bytes, {} left",
                self.position,
                end,
                rest.len()
            )));
        }
        let consumed = if small {
            8
        } else if kind == MI_COMPRESSED {
            end
        } else {
            (end + 7) & !7
        };
        let data = &rest[offset..end];
        self.position = (self.position + consumed).min(self.bytes.len());
        Ok(Some((kind, data)))
    }

    fn require(&mut self, what: &str) -> MorphologyResult<(u32, &'a [u8])> {
        self.next_element()?
            .ok_or_else(|| MorphologyError::format(format!("MAT matrix without {}", what)))
    }
}

fn inflate(data: &[u8]) -> MorphologyResult<Vec<u8>> {
    let mut inflated = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut inflated)
        .map_err(|e| MorphologyError::format(format!("corrupt compressed MAT element: {}", e)))?;
    Ok(inflated)
}

fn indices(endian: Endian, (kind, data): (u32, &[u8]), what: &str) -> MorphologyResult<Vec<usize>> {
    endian
        .numbers(kind, data)?
        .into_iter()
        .map(|value| {
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
                Ok(value as usize)
            } else {
                Err(MorphologyError::format(format!("{} {} is not an index", what, value)))
            }
        })
        .collect()
}

/// Decodes one `miMATRIX` payload into `store`; `false` when the variable is skipped.
fn decode_matrix(data: &[u8], endian: Endian, store: &mut MemoryStore) -> MorphologyResult<bool> {
    if data.is_empty() {
        return Ok(false);
    }
    let mut parts = Elements::new(data, endian);
    let (_, flags) = parts.require("array flags")?;
    if flags.len() < 8 {
        return Err(MorphologyError::format("MAT array flags shorter than 8 bytes"));
    }
    let word = endian.u32(&flags[0..4]);
    let class = word & 0xff;
    let dims = indices(endian, parts.require("dimensions")?, "dimension")?;
    let (_, name) = parts.require("array name")?;
    let name = String::from_utf8_lossy(name).into_owned();

    let [rows, cols] = dims[..] else {
        warn!(target: "vessmorph-io", "Skipping MAT variable '{}' with {} dimensions", name, dims.len());
        return Ok(false);
    };
    if word & COMPLEX_FLAG != 0 {
        warn!(target: "vessmorph-io", "MAT variable '{}' is complex; imaginary part ignored", name);
    }

    match class {
        MX_SPARSE_CLASS => {
            let row_idx = indices(endian, parts.require("sparse row indices")?, "row index")?;
            let col_ptr = indices(endian, parts.require("sparse column pointers")?, "column pointer")?;
            let nnz = col_ptr.last().copied().unwrap_or(0);
            let values = match parts.next_element()? {
                Some((kind, data)) => endian.numbers(kind, data)?,
                None => vec![1.0; nnz],
            };
            if row_idx.len() < nnz || values.len() < nnz {
                return Err(MorphologyError::format(format!(
                    "sparse MAT variable '{}' declares {} entries but stores {} rows and {} values",
                    name,
                    nnz,
                    row_idx.len(),
                    values.len()
                )));
            }
            let matrix = SparseMatrix::from_csc(
                rows,
                cols,
                col_ptr,
                row_idx[..nnz].to_vec(),
                values[..nnz].to_vec(),
            )?;
            store.insert_sparse(name, matrix);
        }
        MX_DOUBLE_CLASS..=MX_UINT64_CLASS => {
            let (kind, real) = parts.require("real part")?;
            let values = endian.numbers(kind, real)?;
            if values.len() != rows * cols {
                return Err(MorphologyError::format(format!(
                    "MAT variable '{}' is {}x{} but stores {} values",
                    name,
                    rows,
                    cols,
                    values.len()
                )));
            }
            // Column-major, as MATLAB stores it.
            let array = Array2::from_shape_vec((rows, cols).f(), values)
                .map_err(|e| MorphologyError::format(format!("MAT variable '{}': {}", name, e)))?;
            store.insert_dense(name, array);
        }
        other => {
            debug!(target: "vessmorph-io", "Skipping MAT variable '{}' of class {}", name, other);
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ArrayStore;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use ndarray::array;
    use std::io::Write;

    const MX_CHAR_CLASS: u32 = 4;

    fn put(endian: Endian, write: fn(&mut [u8], u32), write_big: fn(&mut [u8], u32), value: u32) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        match endian {
            Endian::Little => write(&mut bytes, value),
            Endian::Big => write_big(&mut bytes, value),
        }
        bytes
    }

    fn u32_bytes(endian: Endian, value: u32) -> [u8; 4] {
        put(endian, LittleEndian::write_u32, BigEndian::write_u32, value)
    }

    fn header(endian: Endian, version: u16) -> Vec<u8> {
        let mut header = vec![b' '; HEADER_LEN];
        let text = b"MATLAB 5.0 MAT-file, created by vessmorph tests";
        header[..text.len()].copy_from_slice(text);
        header[116..124].fill(0);
        match endian {
            Endian::Little => {
                LittleEndian::write_u16(&mut header[124..126], version);
                header[126..128].copy_from_slice(b"IM");
            }
            Endian::Big => {
                BigEndian::write_u16(&mut header[124..126], version);
                header[126..128].copy_from_slice(b"MI");
            }
        }
        header
    }

    /// Tagged element; payloads of up to 4 bytes use the small format.
    fn element(endian: Endian, kind: u32, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        if data.len() <= 4 && kind != MI_MATRIX && kind != MI_COMPRESSED {
            out.extend(u32_bytes(endian, ((data.len() as u32) << 16) | kind));
            out.extend(data);
            out.resize(8, 0);
            return out;
        }
        out.extend(u32_bytes(endian, kind));
        out.extend(u32_bytes(endian, data.len() as u32));
        out.extend(data);
        if kind != MI_COMPRESSED {
            out.resize((out.len() + 7) & !7, 0);
        }
        out
    }

    fn int32s(endian: Endian, values: &[usize]) -> Vec<u8> {
        values
            .iter()
            .flat_map(|&v| put(endian, LittleEndian::write_u32, BigEndian::write_u32, v as u32))
            .collect()
    }

    fn doubles(endian: Endian, values: &[f64]) -> Vec<u8> {
        values
            .iter()
            .flat_map(|&v| {
                let mut bytes = [0u8; 8];
                match endian {
                    Endian::Little => LittleEndian::write_f64(&mut bytes, v),
                    Endian::Big => BigEndian::write_f64(&mut bytes, v),
                }
                bytes
            })
            .collect()
    }

    fn matrix(endian: Endian, class: u32, dims: [usize; 2], name: &str, parts: &[Vec<u8>]) -> Vec<u8> {
        let mut body = Vec::new();
        let mut flags = u32_bytes(endian, class).to_vec();
        flags.extend(u32_bytes(endian, 0));
        body.extend(element(endian, MI_UINT32, &flags));
        body.extend(element(endian, MI_INT32, &int32s(endian, &dims)));
        body.extend(element(endian, MI_INT8, name.as_bytes()));
        for part in parts {
            body.extend(part);
        }
        element(endian, MI_MATRIX, &body)
    }

    fn vertices() -> Array2<f64> {
        array![
            [0.0, 0.0, 0.0, 1.0],
            [2.0, 0.0, 0.0, 1.0],
            [1.0, 2.0, 0.0, 1.0],
            [-2.0, 0.0, 0.0, 0.5],
            [4.0, 0.0, 0.0, 0.5],
        ]
    }

    /// Triangle 0-1-2 with attachments 3-0 and 4-1, as CSC arrays.
    fn adjacency_csc() -> (Vec<usize>, Vec<usize>) {
        let edges = [(0, 1), (1, 2), (2, 0), (3, 0), (4, 1)];
        let mut row_idx = Vec::new();
        let mut col_ptr = vec![0];
        for col in 0..5 {
            for row in 0..5 {
                if edges.iter().any(|&(a, b)| (a, b) == (row, col) || (b, a) == (row, col)) {
                    row_idx.push(row);
                }
            }
            col_ptr.push(row_idx.len());
        }
        (row_idx, col_ptr)
    }

    fn variables(endian: Endian) -> Vec<Vec<u8>> {
        let v = vertices();
        let column_major: Vec<f64> = v.t().iter().copied().collect();
        let (row_idx, col_ptr) = adjacency_csc();
        let note = matrix(
            endian,
            MX_CHAR_CLASS,
            [1, 2],
            "note",
            &[element(endian, MI_UINT16, &[0, b'o', 0, b'k'])],
        );
        let v = matrix(
            endian,
            MX_DOUBLE_CLASS,
            [5, 4],
            "V",
            &[element(endian, MI_DOUBLE, &doubles(endian, &column_major))],
        );
        let a = matrix(
            endian,
            MX_SPARSE_CLASS,
            [5, 5],
            "A",
            &[
                element(endian, MI_INT32, &int32s(endian, &row_idx)),
                element(endian, MI_INT32, &int32s(endian, &col_ptr)),
                element(endian, MI_DOUBLE, &doubles(endian, &vec![1.0; row_idx.len()])),
            ],
        );
        vec![note, v, a]
    }

    fn file(endian: Endian, compressed: bool) -> Vec<u8> {
        let mut bytes = header(endian, LEVEL5_VERSION);
        for variable in variables(endian) {
            if compressed {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&variable).unwrap();
                bytes.extend(element(endian, MI_COMPRESSED, &encoder.finish().unwrap()));
            } else {
                bytes.extend(variable);
            }
        }
        bytes
    }

    #[test]
    fn test_header_detection() {
        assert!(is_level5(&header(Endian::Little, LEVEL5_VERSION)));
        assert!(is_level5(&header(Endian::Big, LEVEL5_VERSION)));
        // -v7.3 files carry version 0x0200 in front of their HDF5 payload.
        assert!(!is_level5(&header(Endian::Little, 0x0200)));
        assert!(!is_level5(b"1 0 0 0 0 1 -1\n"));
    }

    #[test]
    fn test_reads_dense_and_sparse_variables() {
        for endian in [Endian::Little, Endian::Big] {
            for compressed in [false, true] {
                let store = read_level5(&file(endian, compressed)).unwrap();
                assert_eq!(store.dense("V").unwrap(), vertices());
                let adjacency = store.sparse("A").unwrap();
                assert_eq!(adjacency.nnz(), 10);
                assert_eq!(adjacency.get(3, 0), 1.0);
                assert_eq!(adjacency.get(0, 3), 1.0);
                assert_eq!(adjacency.get(3, 4), 0.0);
                assert!(!store.contains("note"));
            }
        }
    }

    #[test]
    fn test_narrow_integer_storage_is_widened() {
        let endian = Endian::Little;
        let column: Vec<u8> = [-2i16, 7, 300]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let mut bytes = header(endian, LEVEL5_VERSION);
        bytes.extend(matrix(endian, MX_DOUBLE_CLASS, [3, 1], "x", &[element(endian, MI_INT16, &column)]));
        let store = read_level5(&bytes).unwrap();
        assert_eq!(store.dense("x").unwrap(), array![[-2.0], [7.0], [300.0]]);
    }

    #[test]
    fn test_malformed_files() {
        let whole = file(Endian::Little, false);
        let truncated = read_level5(&whole[..whole.len() - 12]).unwrap_err();
        assert_eq!(truncated.kind(), "format");

        let mut bytes = header(Endian::Little, LEVEL5_VERSION);
        bytes.extend(matrix(
            Endian::Little,
            MX_DOUBLE_CLASS,
            [2, 2],
            "short",
            &[element(Endian::Little, MI_DOUBLE, &doubles(Endian::Little, &[1.0, 2.0, 3.0]))],
        ));
        assert!(read_level5(&bytes).is_err());

        let mut corrupt = header(Endian::Little, LEVEL5_VERSION);
        corrupt.extend(element(Endian::Little, MI_COMPRESSED, b"not zlib at all"));
        assert!(read_level5(&corrupt).is_err());

        assert!(read_level5(&header(Endian::Little, 0x0200)).is_err());
    }

    #[test]
    fn test_load_mat_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triangle.mat");
        std::fs::write(&path, file(Endian::Little, true)).unwrap();
        assert!(has_level5_header(&path).unwrap());

        let morphology = crate::factory::load_morphology(
            &path,
            crate::options::LoadOptions::default(),
            &vessmorph_structures::TaskControl::none(),
        )
        .unwrap();
        assert_eq!(morphology.name(), "triangle");
        assert_eq!(morphology.number_sections(), 3);
        assert_eq!(morphology.sections().iter().filter(|s| s.is_loop).count(), 1);
        assert_eq!(morphology.roots().len(), 2);
    }
}
