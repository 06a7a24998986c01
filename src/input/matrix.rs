use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use memmap2::Mmap;
use ndarray::Array2;

use crate::error::{CalError, Result};
use crate::model::scores::ScoreMatrix;

// KSCM v1, little endian:
//   0  magic "KSCM"        4  version major u16    6  version minor u16
//   8  endianness tag u32  12 header size u32      16 n_rows u64
//   24 n_cols u64          32 rows table offset    40 rows table bytes
//   48 cols table offset   56 cols table bytes     64 values offset
//   72 file bytes          80 data fnv64           88 reserved
// String tables: u32 count, (count + 1) u32 offsets, utf-8 blob.
// Values: n_rows * n_cols f64, row-major, 8-byte aligned.
const MAGIC: &[u8; 4] = b"KSCM";
const HEADER_BYTES: usize = 96;
const ENDIAN_TAG: u32 = 0x1234_5678;

#[derive(Debug, Clone)]
struct HeaderV1 {
    n_rows: u64,
    n_cols: u64,
    rows_table_offset: u64,
    rows_table_bytes: u64,
    cols_table_offset: u64,
    cols_table_bytes: u64,
    values_offset: u64,
    file_bytes: u64,
    data_fnv64: u64,
}

pub fn read_score_matrix(path: &Path) -> Result<ScoreMatrix> {
    let file = File::open(path)?;
    if (file.metadata()?.len() as usize) < HEADER_BYTES {
        return Err(CalError::MalformedInput(format!(
            "{}: too small for a score matrix",
            path.display()
        )));
    }
    let mmap = unsafe { Mmap::map(&file)? };
    let matrix = parse_score_matrix(&mmap[..])?;
    let (n_rows, n_cols) = matrix.shape();
    tracing::info!(
        path = %path.display(),
        n_rows,
        n_cols,
        "loaded score matrix"
    );
    Ok(matrix)
}

fn parse_score_matrix(bytes: &[u8]) -> Result<ScoreMatrix> {
    let header = parse_header(bytes)?;
    validate_header(&header, bytes)?;

    let n_rows = to_usize(header.n_rows)?;
    let n_cols = to_usize(header.n_cols)?;
    let enroll_ids = parse_string_table(
        bytes,
        header.rows_table_offset,
        header.rows_table_bytes,
        n_rows,
    )?;
    let test_ids = parse_string_table(
        bytes,
        header.cols_table_offset,
        header.cols_table_bytes,
        n_cols,
    )?;
    let n_values = n_rows
        .checked_mul(n_cols)
        .ok_or_else(|| malformed("matrix size overflow"))?;
    let values = read_f64_vec(bytes, header.values_offset, n_values)?;
    let values = Array2::from_shape_vec((n_rows, n_cols), values)
        .map_err(|e| malformed(&format!("value block: {e}")))?;

    ScoreMatrix::new(enroll_ids, test_ids, values)
}

fn parse_header(bytes: &[u8]) -> Result<HeaderV1> {
    if bytes.len() < HEADER_BYTES {
        return Err(malformed("file shorter than header"));
    }
    if &bytes[0..4] != MAGIC {
        return Err(malformed("invalid magic; expected KSCM"));
    }
    let major = read_u16(bytes, 4);
    let minor = read_u16(bytes, 6);
    if major != 1 || minor != 0 {
        return Err(malformed(&format!("unsupported version: {major}.{minor}")));
    }
    if read_u32(bytes, 8) != ENDIAN_TAG {
        return Err(malformed("unsupported endianness tag"));
    }
    if read_u32(bytes, 12) as usize != HEADER_BYTES {
        return Err(malformed("invalid header size"));
    }
    Ok(HeaderV1 {
        n_rows: read_u64(bytes, 16),
        n_cols: read_u64(bytes, 24),
        rows_table_offset: read_u64(bytes, 32),
        rows_table_bytes: read_u64(bytes, 40),
        cols_table_offset: read_u64(bytes, 48),
        cols_table_bytes: read_u64(bytes, 56),
        values_offset: read_u64(bytes, 64),
        file_bytes: read_u64(bytes, 72),
        data_fnv64: read_u64(bytes, 80),
    })
}

fn validate_header(header: &HeaderV1, bytes: &[u8]) -> Result<()> {
    if header.file_bytes != bytes.len() as u64 {
        return Err(malformed("file_bytes does not match file length"));
    }
    if header.values_offset % 8 != 0 {
        return Err(malformed("values block is not 8-byte aligned"));
    }
    if fnv64(&bytes[HEADER_BYTES..]) != header.data_fnv64 {
        return Err(malformed("data checksum mismatch"));
    }
    Ok(())
}

fn parse_string_table(
    bytes: &[u8],
    offset: u64,
    table_bytes: u64,
    expected_count: usize,
) -> Result<Vec<String>> {
    let offset = to_usize(offset)?;
    let table_bytes = to_usize(table_bytes)?;
    let end = offset
        .checked_add(table_bytes)
        .ok_or_else(|| malformed("string table offset overflow"))?;
    if end > bytes.len() || table_bytes < 8 {
        return Err(malformed("string table out of bounds"));
    }
    let tbl = &bytes[offset..end];
    let count = read_u32(tbl, 0) as usize;
    if count != expected_count {
        return Err(malformed("string table count mismatch"));
    }
    let offsets_end = (count + 1)
        .checked_mul(4)
        .and_then(|n| n.checked_add(4))
        .ok_or_else(|| malformed("string table offset overflow"))?;
    if offsets_end > tbl.len() {
        return Err(malformed("string table offsets out of bounds"));
    }
    let blob = &tbl[offsets_end..];
    let offsets: Vec<usize> = (0..=count)
        .map(|i| read_u32(tbl, 4 + i * 4) as usize)
        .collect();
    if offsets[count] > blob.len() {
        return Err(malformed("string table blob length mismatch"));
    }

    let mut out = Vec::with_capacity(count);
    for pair in offsets.windows(2) {
        let (start, stop) = (pair[0], pair[1]);
        if start > stop {
            return Err(malformed("string table offsets not monotonic"));
        }
        if stop > blob.len() {
            return Err(malformed("string table offset past end of blob"));
        }
        let s = std::str::from_utf8(&blob[start..stop])
            .map_err(|_| malformed("invalid utf-8 in string table"))?;
        out.push(s.to_string());
    }
    Ok(out)
}

fn read_f64_vec(bytes: &[u8], offset: u64, len: usize) -> Result<Vec<f64>> {
    let offset = to_usize(offset)?;
    let end = len
        .checked_mul(8)
        .and_then(|n| n.checked_add(offset))
        .ok_or_else(|| malformed("value block size overflow"))?;
    if end > bytes.len() {
        return Err(malformed("value block out of bounds"));
    }
    Ok(bytes[offset..end]
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect())
}

pub fn write_score_matrix(path: &Path, matrix: &ScoreMatrix) -> Result<()> {
    let bytes = encode_score_matrix(matrix);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&bytes)?;
    out.flush()?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote score matrix");
    Ok(())
}

fn encode_score_matrix(matrix: &ScoreMatrix) -> Vec<u8> {
    let rows = build_string_table(matrix.enroll_ids());
    let cols = build_string_table(matrix.test_ids());
    let (n_rows, n_cols) = matrix.shape();

    let rows_offset = HEADER_BYTES;
    let cols_offset = align8(rows_offset + rows.len());
    let values_offset = align8(cols_offset + cols.len());
    let file_bytes = values_offset + n_rows * n_cols * 8;

    let mut bytes = vec![0u8; file_bytes];
    bytes[0..4].copy_from_slice(MAGIC);
    put(&mut bytes, 4, &1u16.to_le_bytes());
    put(&mut bytes, 6, &0u16.to_le_bytes());
    put(&mut bytes, 8, &ENDIAN_TAG.to_le_bytes());
    put(&mut bytes, 12, &(HEADER_BYTES as u32).to_le_bytes());
    put(&mut bytes, 16, &(n_rows as u64).to_le_bytes());
    put(&mut bytes, 24, &(n_cols as u64).to_le_bytes());
    put(&mut bytes, 32, &(rows_offset as u64).to_le_bytes());
    put(&mut bytes, 40, &(rows.len() as u64).to_le_bytes());
    put(&mut bytes, 48, &(cols_offset as u64).to_le_bytes());
    put(&mut bytes, 56, &(cols.len() as u64).to_le_bytes());
    put(&mut bytes, 64, &(values_offset as u64).to_le_bytes());
    put(&mut bytes, 72, &(file_bytes as u64).to_le_bytes());

    put(&mut bytes, rows_offset, &rows);
    put(&mut bytes, cols_offset, &cols);
    for (i, v) in matrix.values().iter().enumerate() {
        put(&mut bytes, values_offset + i * 8, &v.to_le_bytes());
    }

    let checksum = fnv64(&bytes[HEADER_BYTES..]);
    put(&mut bytes, 80, &checksum.to_le_bytes());
    bytes
}

fn build_string_table(items: &[String]) -> Vec<u8> {
    let mut blob = Vec::new();
    let mut out = Vec::with_capacity(4 + (items.len() + 1) * 4);
    out.extend_from_slice(&(items.len() as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    for item in items {
        blob.extend_from_slice(item.as_bytes());
        out.extend_from_slice(&(blob.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(&blob);
    out
}

fn put(bytes: &mut [u8], offset: usize, src: &[u8]) {
    bytes[offset..offset + src.len()].copy_from_slice(src);
}

fn align8(v: usize) -> usize {
    v.div_ceil(8) * 8
}

fn malformed(msg: &str) -> CalError {
    CalError::MalformedInput(format!("score matrix: {msg}"))
}

fn to_usize(v: u64) -> Result<usize> {
    usize::try_from(v).map_err(|_| malformed("size does not fit in memory"))
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(&bytes[offset..offset + 2]);
    u16::from_le_bytes(raw)
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

fn fnv64(data: &[u8]) -> u64 {
    let mut h = 0xcbf2_9ce4_8422_2325u64;
    for &b in data {
        h ^= b as u64;
        h = h.wrapping_mul(0x0100_0000_01b3);
    }
    h
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/matrix.rs"]
mod tests;
