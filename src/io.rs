//! `.vbp` instance parsing and solution emission, per §6/§10.3. The parser
//! is intentionally forgiving the way the reference implementation's is: an
//! item line may carry more than `d` tokens, and only the first `d` are
//! read.

use std::io::{BufRead, Write};

use crate::bin::Bin;
use crate::error::{Result, VbppError};
use crate::instance::{self, Instance};

/// Controls the order bins are listed in an emitted solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionOrder {
    /// The order bins were created in (default).
    Creation,
    /// Sorted by bin id.
    ById,
}

/// Controls whether emitted item identifiers are 0-based or 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdBase {
    ZeroBased,
    OneBased,
}

fn malformed(path: &str, line: usize, reason: impl Into<String>) -> VbppError {
    VbppError::InstanceMalformed {
        path: path.to_string(),
        line,
        reason: reason.into(),
    }
}

fn parse_ints(path: &str, line_no: usize, line: &str, reason_prefix: &str) -> Result<Vec<i64>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<i64>()
                .map_err(|_| malformed(path, line_no, format!("{reason_prefix}: non-integer token '{tok}'")))
        })
        .collect()
}

/// Reads a `.vbp` instance from `reader`. `path` is used only for error
/// messages. `shuffle`/`seed` are forwarded to [`Instance::with_seed`].
pub fn read_instance(
    path: &str,
    reader: impl BufRead,
    shuffle: bool,
    seed: u64,
) -> Result<Instance> {
    let lines: Vec<String> = reader
        .lines()
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| malformed(path, 0, format!("failed to read file: {e}")))?;
    let mut lines = lines.into_iter().enumerate().map(|(i, l)| (i + 1, l));

    let (dim_line_no, dim_line) = lines.next().ok_or_else(|| malformed(path, 1, "missing dimension count"))?;
    let dims_raw = parse_ints(path, dim_line_no, &dim_line, "dimension count")?;
    if dims_raw.len() != 1 || dims_raw[0] <= 0 {
        return Err(malformed(path, dim_line_no, "expected a single positive dimension count"));
    }
    let dims = dims_raw[0] as usize;

    let (cap_line_no, cap_line) = lines.next().ok_or_else(|| malformed(path, dim_line_no + 1, "missing capacity line"))?;
    let cap_raw = parse_ints(path, cap_line_no, &cap_line, "capacity line")?;
    if cap_raw.len() != dims {
        return Err(malformed(
            path,
            cap_line_no,
            format!("expected {dims} capacities, found {}", cap_raw.len()),
        ));
    }
    let mut capacities = Vec::with_capacity(dims);
    for &c in &cap_raw {
        if c <= 0 {
            return Err(malformed(path, cap_line_no, "capacity must be positive"));
        }
        capacities.push(c as u64);
    }

    let (n_line_no, n_line) = lines.next().ok_or_else(|| malformed(path, cap_line_no + 1, "missing item count"))?;
    let n_raw = parse_ints(path, n_line_no, &n_line, "item count")?;
    if n_raw.len() != 1 || n_raw[0] < 0 {
        return Err(malformed(path, n_line_no, "expected a single non-negative item count"));
    }
    let n = n_raw[0] as usize;

    let mut sizes = Vec::with_capacity(n);
    for i in 0..n {
        let (item_line_no, item_line) = lines
            .next()
            .ok_or_else(|| malformed(path, n_line_no + 1 + i, format!("missing size line for item {i}")))?;
        let item_raw = parse_ints(path, item_line_no, &item_line, "item size line")?;
        if item_raw.len() < dims {
            return Err(malformed(
                path,
                item_line_no,
                format!("expected at least {dims} sizes, found {}", item_raw.len()),
            ));
        }
        let mut item_sizes = Vec::with_capacity(dims);
        for h in 0..dims {
            if item_raw[h] < 0 {
                return Err(malformed(path, item_line_no, "item size must not be negative"));
            }
            item_sizes.push(item_raw[h] as u64);
        }
        sizes.push(item_sizes);
    }

    Ok(Instance::with_seed(path, capacities, sizes, shuffle, seed))
}

/// Loads an instance with the default shuffle seed ([`instance::DEFAULT_SHUFFLE_SEED`]).
pub fn load_instance(path: &str, reader: impl BufRead, shuffle: bool) -> Result<Instance> {
    read_instance(path, reader, shuffle, instance::DEFAULT_SHUFFLE_SEED)
}

/// Writes the solution format of §6: a bin count line, then one line per
/// bin of `<count> <id> <id> ...`.
pub fn write_solution(writer: &mut impl Write, bins: &[Bin], order: SolutionOrder, id_base: IdBase) -> std::io::Result<()> {
    let mut ordered: Vec<&Bin> = bins.iter().collect();
    if order == SolutionOrder::ById {
        ordered.sort_by_key(|b| b.id());
    }

    writeln!(writer, "{}", ordered.len())?;
    let offset: usize = match id_base {
        IdBase::ZeroBased => 0,
        IdBase::OneBased => 1,
    };
    for bin in ordered {
        let ids: Vec<String> = bin.alloc_list().iter().map(|&id| (id + offset).to_string()).collect();
        writeln!(writer, "{} {}", bin.alloc_list().len(), ids.join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> &'static str {
        "2\n10 10\n3\n4 3\n5 5 99\n6 1\n"
    }

    #[test]
    fn parses_well_formed_instance() {
        let inst = read_instance("s.vbp", Cursor::new(sample()), false, 1).unwrap();
        assert_eq!(inst.dims(), 2);
        assert_eq!(inst.capacities(), &[10, 10]);
        assert_eq!(inst.n_items(), 3);
        assert_eq!(inst.item(1).sizes(), &[5, 5]);
    }

    #[test]
    fn rejects_wrong_capacity_count() {
        let bad = "2\n10\n1\n4 3\n";
        let err = read_instance("s.vbp", Cursor::new(bad), false, 1).unwrap_err();
        match err {
            VbppError::InstanceMalformed { line, .. } => assert_eq!(line, 2),
            _ => panic!("expected InstanceMalformed"),
        }
    }

    #[test]
    fn rejects_non_integer_token() {
        let bad = "1\n10\n1\nfoo\n";
        let err = read_instance("s.vbp", Cursor::new(bad), false, 1).unwrap_err();
        match err {
            VbppError::InstanceMalformed { line, .. } => assert_eq!(line, 4),
            _ => panic!("expected InstanceMalformed"),
        }
    }

    #[test]
    fn rejects_negative_capacity() {
        let bad = "1\n-5\n0\n";
        assert!(read_instance("s.vbp", Cursor::new(bad), false, 1).is_err());
    }

    #[test]
    fn rejects_missing_item_line() {
        let bad = "1\n10\n2\n3\n";
        assert!(read_instance("s.vbp", Cursor::new(bad), false, 1).is_err());
    }

    #[test]
    fn write_solution_emits_counts_and_ids() {
        use std::rc::Rc;
        let caps: Rc<[u64]> = Rc::from(vec![10u64].into_boxed_slice());
        let mut b0 = Bin::new(0, Rc::clone(&caps));
        b0.add_item(0, &[3]);
        b0.add_item(1, &[2]);
        let mut b1 = Bin::new(1, caps);
        b1.add_item(2, &[5]);

        let mut out = Vec::new();
        write_solution(&mut out, &[b0, b1], SolutionOrder::Creation, IdBase::ZeroBased).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "2\n2 0 1\n1 2\n");
    }

    #[test]
    fn write_solution_applies_one_based_offset() {
        use std::rc::Rc;
        let caps: Rc<[u64]> = Rc::from(vec![10u64].into_boxed_slice());
        let mut b0 = Bin::new(0, caps);
        b0.add_item(4, &[1]);

        let mut out = Vec::new();
        write_solution(&mut out, &[b0], SolutionOrder::Creation, IdBase::OneBased).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n1 5\n");
    }
}
