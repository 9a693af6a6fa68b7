//! Checks run on user input before any request is sent.

use crate::editor::{Graph, SteinerRequest};
use crate::error::InputError;
use crate::search::{Board, PuzzleRequest, SearchGraph};
use crate::viz::hungarian::{HungarianRequest, ProblemType};
use crate::viz::knapsack::{Item, KnapsackRequest};
use crate::viz::lcs::LcsRequest;
use crate::viz::lps::LpsRequest;
use crate::viz::matrix_chain::MatrixChainRequest;
use crate::viz::med::MedRequest;
use crate::viz::obst::ObstRequest;
use crate::viz::printing_neatly::PrintingNeatlyRequest;
use crate::viz::rod_cutting::RodCuttingRequest;

/// Largest knapsack capacity; the table has one column per unit.
pub const MAX_CAPACITY: i64 = 100;
/// Longest rod, and longest piece with a price.
pub const MAX_ROD_LENGTH: i64 = 100;
/// Longest string accepted by the string tables.
pub const MAX_TEXT_LEN: usize = 60;
/// Most words in a paragraph to lay out.
pub const MAX_WORDS: usize = 40;
/// Widest line, in characters.
pub const MAX_LINE_WIDTH: i64 = 80;

pub fn int(field: &'static str, raw: &str) -> Result<i64, InputError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(InputError::Missing { field });
    }
    s.parse().map_err(|_| InputError::NotANumber {
        field,
        value: s.to_string(),
    })
}

pub fn positive_int(field: &'static str, raw: &str) -> Result<i64, InputError> {
    match int(field, raw)? {
        v if v > 0 => Ok(v),
        _ => Err(InputError::NotPositive { field }),
    }
}

pub fn non_negative_int(field: &'static str, raw: &str) -> Result<i64, InputError> {
    match int(field, raw)? {
        v if v >= 0 => Ok(v),
        _ => Err(InputError::Negative { field }),
    }
}

/// Finite, non-negative probability.
pub fn probability(field: &'static str, raw: &str) -> Result<f64, InputError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(InputError::Missing { field });
    }
    let v: f64 = s.parse().map_err(|_| InputError::NotANumber {
        field,
        value: s.to_string(),
    })?;
    if !v.is_finite() {
        return Err(InputError::NotANumber {
            field,
            value: s.to_string(),
        });
    }
    if v < 0.0 {
        return Err(InputError::Negative { field });
    }
    Ok(v)
}

/// A positive integer no larger than `max`.
pub fn bounded_int(field: &'static str, raw: &str, max: i64) -> Result<i64, InputError> {
    match positive_int(field, raw)? {
        v if v > max => Err(InputError::TooLarge { field, max }),
        v => Ok(v),
    }
}

/// Size typed into a field that drives a live preview. Anything unparsable
/// previews as zero and anything too large previews at `max`.
pub fn preview_size(raw: &str, max: i64) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0).clamp(0, max)
}

fn non_empty(field: &'static str, raw: &str) -> Result<String, InputError> {
    if raw.trim().is_empty() {
        Err(InputError::Missing { field })
    } else if raw.chars().count() > MAX_TEXT_LEN {
        Err(InputError::TooLong {
            field,
            max: MAX_TEXT_LEN,
        })
    } else {
        Ok(raw.to_string())
    }
}

pub fn knapsack(capacity: &str, items: &[Item]) -> Result<KnapsackRequest, InputError> {
    let capacity = bounded_int("capacity", capacity, MAX_CAPACITY)?;
    if items.is_empty() {
        return Err(InputError::TooFew { what: "item", min: 1 });
    }
    Ok(KnapsackRequest {
        capacity,
        items: items.to_vec(),
    })
}

pub fn lcs(text1: &str, text2: &str) -> Result<LcsRequest, InputError> {
    Ok(LcsRequest {
        text1: non_empty("text1", text1)?,
        text2: non_empty("text2", text2)?,
    })
}

pub fn lps(text: &str) -> Result<LpsRequest, InputError> {
    Ok(LpsRequest {
        text: non_empty("text", text)?.trim().to_string(),
    })
}

pub fn med(s1: &str, s2: &str) -> Result<MedRequest, InputError> {
    Ok(MedRequest {
        s1: non_empty("s1", s1)?,
        s2: non_empty("s2", s2)?,
    })
}

/// `dims` holds n+1 boundaries for n matrices.
pub fn matrix_chain(dims: &[i64]) -> Result<MatrixChainRequest, InputError> {
    if dims.len() < 3 {
        return Err(InputError::TooFew { what: "matrices", min: 2 });
    }
    if dims.iter().any(|d| *d <= 0) {
        return Err(InputError::NotPositive { field: "dimension" });
    }
    Ok(MatrixChainRequest { dims: dims.to_vec() })
}

/// `prices[i]` is the price of a piece of length `i + 1`.
pub fn rod_cutting(length: &str, prices: &[i64]) -> Result<RodCuttingRequest, InputError> {
    let n = bounded_int("length", length, MAX_ROD_LENGTH)?;
    if prices.len() as i64 > MAX_ROD_LENGTH {
        return Err(InputError::TooLarge {
            field: "price length",
            max: MAX_ROD_LENGTH,
        });
    }
    if prices.iter().any(|p| *p < 0) {
        return Err(InputError::Negative { field: "price" });
    }
    Ok(RodCuttingRequest {
        n,
        prices: prices.to_vec(),
    })
}

/// Rows of raw cell text, as typed into the input grid.
pub fn hungarian(rows: &[Vec<String>], problem_type: ProblemType) -> Result<HungarianRequest, InputError> {
    let n = rows.len();
    if n == 0 {
        return Err(InputError::TooFew { what: "rows", min: 1 });
    }
    let mut matrix = Vec::with_capacity(n);
    for (r, row) in rows.iter().enumerate() {
        if row.len() != n {
            return Err(InputError::NotSquare { row: r, len: row.len(), n });
        }
        let parsed = row
            .iter()
            .enumerate()
            .map(|(c, raw)| raw.trim().parse::<i64>().map_err(|_| InputError::BadCell { row: r, col: c }))
            .collect::<Result<Vec<_>, _>>()?;
        matrix.push(parsed);
    }
    Ok(HungarianRequest { matrix, problem_type })
}

/// `q`, when present, holds `q0..qn` and so must be one longer than `p`.
pub fn obst(p: &[f64], q: Option<&[f64]>) -> Result<ObstRequest, InputError> {
    if p.is_empty() {
        return Err(InputError::TooFew { what: "key", min: 1 });
    }
    let finite = |v: &f64| v.is_finite() && *v >= 0.0;
    if !p.iter().all(finite) {
        return Err(InputError::Negative { field: "p" });
    }
    if let Some(q) = q {
        if q.len() != p.len() + 1 {
            return Err(InputError::QLength {
                expected: p.len() + 1,
                got: q.len(),
            });
        }
        if !q.iter().all(finite) {
            return Err(InputError::Negative { field: "q" });
        }
    }
    Ok(ObstRequest {
        p: p.to_vec(),
        q: q.map(<[f64]>::to_vec),
    })
}

/// At least two terminals and a positive weight on every edge.
pub fn steiner(graph: &Graph) -> Result<SteinerRequest, InputError> {
    if graph.terminals.len() < 2 {
        return Err(InputError::TooFew { what: "terminals", min: 2 });
    }
    if let Some(e) = graph.edges.iter().find(|e| e.w <= 0) {
        return Err(InputError::BadWeight {
            u: e.u.clone(),
            v: e.v.clone(),
        });
    }
    Ok(SteinerRequest {
        nodes: graph.nodes.clone(),
        edges: graph.edges.clone(),
        terminals: graph.terminals.clone(),
    })
}

/// A paragraph where every word fits on a line of `width` characters.
pub fn printing_neatly(text: &str, width: &str) -> Result<PrintingNeatlyRequest, InputError> {
    let m = bounded_int("M", width, MAX_LINE_WIDTH)?;
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Err(InputError::Missing { field: "text" });
    }
    if words.len() > MAX_WORDS {
        return Err(InputError::TooLarge {
            field: "word count",
            max: MAX_WORDS as i64,
        });
    }
    if let Some(word) = words.iter().find(|w| w.chars().count() as i64 > m) {
        return Err(InputError::WordTooLong {
            word: word.to_string(),
            width: m,
        });
    }
    Ok(PrintingNeatlyRequest {
        text: words.join(" "),
        m,
    })
}

/// Nine cells, read row by row, holding 0 to 8 once each. Blank cells
/// count as 0.
pub fn puzzle_board(field: &'static str, cells: &[String]) -> Result<Board, InputError> {
    if cells.len() != 9 {
        return Err(InputError::NotAPermutation { field });
    }
    let mut board = [[0u8; 3]; 3];
    let mut seen = [false; 9];
    for (k, raw) in cells.iter().enumerate() {
        let s = raw.trim();
        let v: i64 = if s.is_empty() {
            0
        } else {
            s.parse().map_err(|_| InputError::NotANumber {
                field,
                value: s.to_string(),
            })?
        };
        let Some(slot) = usize::try_from(v).ok().filter(|&v| v < 9) else {
            return Err(InputError::NotAPermutation { field });
        };
        if seen[slot] {
            return Err(InputError::NotAPermutation { field });
        }
        seen[slot] = true;
        board[k / 3][k % 3] = slot as u8;
    }
    Ok(board)
}

pub fn puzzle(start: &[String], goal: &[String]) -> Result<PuzzleRequest, InputError> {
    Ok(PuzzleRequest {
        start: puzzle_board("start board", start)?,
        goal: puzzle_board("goal board", goal)?,
    })
}

/// A generated graph whose start and goal are among its nodes.
pub fn search_graph(graph: &SearchGraph) -> Result<SearchGraph, InputError> {
    if graph.is_empty() {
        return Err(InputError::Missing { field: "graph" });
    }
    if graph.node(&graph.start).is_none() {
        return Err(InputError::Missing { field: "start node" });
    }
    if graph.node(&graph.goal).is_none() {
        return Err(InputError::Missing { field: "goal node" });
    }
    Ok(graph.clone())
}

pub fn tree_key(raw: &str) -> Result<String, InputError> {
    Ok(non_empty("key", raw)?.trim().to_string())
}

pub fn binary_key(raw: &str) -> Result<String, InputError> {
    let key = tree_key(raw)?;
    if key.chars().all(|c| c == '0' || c == '1') {
        Ok(key)
    } else {
        Err(InputError::NotBinary(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_trimmed_and_checked() {
        assert_eq!(int("n", " 7 "), Ok(7));
        assert_eq!(int("n", ""), Err(InputError::Missing { field: "n" }));
        assert!(matches!(int("n", "7a"), Err(InputError::NotANumber { .. })));
        assert_eq!(positive_int("n", "0"), Err(InputError::NotPositive { field: "n" }));
        assert_eq!(non_negative_int("n", "0"), Ok(0));
    }

    #[test]
    fn probabilities_must_be_finite_and_non_negative() {
        assert_eq!(probability("p", "0.15"), Ok(0.15));
        assert_eq!(probability("p", "-0.1"), Err(InputError::Negative { field: "p" }));
        assert!(probability("p", "NaN").is_err());
        assert!(probability("p", "inf").is_err());
    }

    #[test]
    fn knapsack_needs_capacity_and_items() {
        let items = [Item { w: 2, v: 3 }];
        assert!(knapsack("5", &items).is_ok());
        assert_eq!(knapsack("0", &items), Err(InputError::NotPositive { field: "capacity" }));
        assert_eq!(knapsack("5", &[]), Err(InputError::TooFew { what: "item", min: 1 }));
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        let items = [Item { w: 2, v: 3 }];
        assert_eq!(
            knapsack("100000000000", &items),
            Err(InputError::TooLarge { field: "capacity", max: MAX_CAPACITY })
        );
        assert!(knapsack(&MAX_CAPACITY.to_string(), &items).is_ok());
        assert_eq!(
            rod_cutting("101", &[]),
            Err(InputError::TooLarge { field: "length", max: MAX_ROD_LENGTH })
        );
    }

    #[test]
    fn preview_sizes_are_clamped() {
        assert_eq!(preview_size("100000000000", MAX_CAPACITY), MAX_CAPACITY);
        assert_eq!(preview_size("99999999999999999999999", MAX_CAPACITY), 0);
        assert_eq!(preview_size("-4", MAX_CAPACITY), 0);
        assert_eq!(preview_size(" 7 ", MAX_CAPACITY), 7);
    }

    #[test]
    fn long_strings_are_rejected() {
        let long = "a".repeat(MAX_TEXT_LEN + 1);
        assert_eq!(
            lcs(&long, "ab"),
            Err(InputError::TooLong { field: "text1", max: MAX_TEXT_LEN })
        );
        assert!(med("ab", &"b".repeat(MAX_TEXT_LEN)).is_ok());
    }

    #[test]
    fn string_inputs() {
        assert!(lcs("ABC", "").is_err());
        assert_eq!(lps("  abba ").unwrap().text, "abba");
        assert!(med("", "x").is_err());
    }

    #[test]
    fn matrix_chain_needs_two_positive_matrices() {
        assert!(matrix_chain(&[10, 20]).is_err());
        assert!(matrix_chain(&[10, 0, 5]).is_err());
        assert_eq!(matrix_chain(&[30, 35, 15]).unwrap().dims, vec![30, 35, 15]);
    }

    #[test]
    fn hungarian_rejects_ragged_and_blank_cells() {
        let ok = vec![vec!["1".to_string(), "2".into()], vec!["3".into(), "4".into()]];
        assert_eq!(hungarian(&ok, ProblemType::Min).unwrap().matrix, vec![vec![1, 2], vec![3, 4]]);
        let ragged = vec![vec!["1".to_string(), "2".into()], vec!["3".into()]];
        assert_eq!(
            hungarian(&ragged, ProblemType::Min),
            Err(InputError::NotSquare { row: 1, len: 1, n: 2 })
        );
        let blank = vec![vec!["1".to_string(), "".into()], vec!["3".into(), "4".into()]];
        assert_eq!(hungarian(&blank, ProblemType::Max), Err(InputError::BadCell { row: 0, col: 1 }));
    }

    #[test]
    fn obst_checks_q_length() {
        assert!(obst(&[], None).is_err());
        assert_eq!(obst(&[0.2, 0.3], None).unwrap().q, None);
        assert_eq!(
            obst(&[0.2, 0.3], Some(&[0.05, 0.1])),
            Err(InputError::QLength { expected: 3, got: 2 })
        );
        assert!(obst(&[0.2], Some(&[0.05, f64::NAN])).is_err());
    }

    #[test]
    fn tree_keys() {
        assert!(tree_key("  ").is_err());
        assert_eq!(binary_key(" 0101 "), Ok("0101".to_string()));
        assert_eq!(binary_key("012"), Err(InputError::NotBinary("012".into())));
    }

    #[test]
    fn paragraphs_must_fit_the_line() {
        let req = printing_neatly("  the quick\n brown fox ", "10").unwrap();
        assert_eq!(req.text, "the quick brown fox");
        assert_eq!(req.m, 10);
        assert_eq!(
            printing_neatly("a extraordinarily b", "6"),
            Err(InputError::WordTooLong { word: "extraordinarily".into(), width: 6 })
        );
        assert_eq!(printing_neatly("   ", "6"), Err(InputError::Missing { field: "text" }));
        assert_eq!(printing_neatly("a", "500"), Err(InputError::TooLarge { field: "M", max: MAX_LINE_WIDTH }));
        let many = vec!["w"; MAX_WORDS + 1].join(" ");
        assert!(matches!(printing_neatly(&many, "5"), Err(InputError::TooLarge { field: "word count", .. })));
    }

    fn cells(flat: &[&str]) -> Vec<String> {
        flat.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn puzzle_boards_are_permutations() {
        let start = cells(&["2", "8", "3", "1", "6", "4", "7", "", "5"]);
        let goal = cells(&["1", "2", "3", "8", "0", "4", "7", "6", "5"]);
        let req = puzzle(&start, &goal).unwrap();
        assert_eq!(req.start, crate::search::DEFAULT_START);
        assert_eq!(req.goal, crate::search::DEFAULT_GOAL);

        let repeated = cells(&["1", "1", "3", "8", "0", "4", "7", "6", "5"]);
        assert_eq!(puzzle(&repeated, &goal), Err(InputError::NotAPermutation { field: "start board" }));
        let out_of_range = cells(&["9", "2", "3", "8", "0", "4", "7", "6", "5"]);
        assert_eq!(puzzle(&start, &out_of_range), Err(InputError::NotAPermutation { field: "goal board" }));
        assert!(matches!(puzzle(&cells(&["x"; 9]), &goal), Err(InputError::NotANumber { .. })));
        assert!(puzzle(&cells(&["1", "2"]), &goal).is_err());
    }

    #[test]
    fn search_graph_needs_nodes_and_endpoints() {
        assert_eq!(search_graph(&SearchGraph::default()), Err(InputError::Missing { field: "graph" }));
        let mut graph = SearchGraph::seeded(5, 600.0, 400.0);
        assert!(search_graph(&graph).is_ok());
        graph.goal = "missing".into();
        assert_eq!(search_graph(&graph), Err(InputError::Missing { field: "goal node" }));
    }
}
