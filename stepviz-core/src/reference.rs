//! Offline step generators for knapsack and LCS.
//!
//! Both produce the exact JSON records the server sends, so a page can run
//! without a backend and the end-to-end properties can be checked on the
//! host.

use serde_json::{Value, json};

use crate::validate;
use crate::viz::knapsack::KnapsackRequest;
use crate::viz::lcs::LcsRequest;

/// Response body for a generated sequence, as the server would send it.
pub fn body(steps: Vec<Value>) -> String {
    Value::Array(steps).to_string()
}

pub fn knapsack(req: &KnapsackRequest) -> Vec<Value> {
    let n = req.items.len();
    let cap = usize::try_from(req.capacity.clamp(0, validate::MAX_CAPACITY)).unwrap_or(0);
    let mut dp = vec![vec![0i64; cap + 1]; n + 1];
    let mut steps = vec![json!({
        "table": dp,
        "items": req.items,
        "capacity": cap,
        "current": null,
        "highlights": [],
        "msg": format!("初始化 DP 表格 ({} x {})，所有值為 0。", n + 1, cap + 1),
    })];

    for i in 1..=n {
        let item = req.items[i - 1];
        for w in 1..=cap {
            let exclude = dp[i - 1][w];
            let (highlights, msg) = match usize::try_from(item.w).ok().filter(|&iw| iw <= w) {
                None => {
                    dp[i][w] = exclude;
                    (
                        json!([{"r": i - 1, "c": w, "color": "#aaddff", "label": "不放"}]),
                        format!("物品 {i} 重 {} 超過容量 {w}，沿用上方 dp[{}][{w}] = {exclude}。", item.w, i - 1),
                    )
                }
                Some(iw) => {
                    let include = item.v + dp[i - 1][w - iw];
                    dp[i][w] = include.max(exclude);
                    let verdict = if include > exclude { "放入" } else { "不放" };
                    (
                        json!([
                            {"r": i - 1, "c": w, "color": "#aaddff", "label": format!("不放: {exclude}")},
                            {"r": i - 1, "c": w - iw, "color": "#aaffaa", "label": format!("放入: {include}")},
                        ]),
                        format!("物品 {i}：不放 = {exclude}，放入 = {include}，選擇{verdict}。"),
                    )
                }
            };
            steps.push(json!({
                "table": dp,
                "items": req.items,
                "capacity": cap,
                "current": {"r": i, "c": w},
                "highlights": highlights,
                "msg": msg,
            }));
        }
    }

    steps.push(json!({
        "table": dp,
        "items": req.items,
        "capacity": cap,
        "current": {"r": n, "c": cap},
        "highlights": [],
        "msg": format!("計算完成，最大價值為 {}。", dp[n][cap]),
    }));
    steps
}

pub fn lcs(req: &LcsRequest) -> Vec<Value> {
    let x: Vec<char> = req.text1.chars().collect();
    let y: Vec<char> = req.text2.chars().collect();
    let (m, n) = (x.len(), y.len());
    let mut c = vec![vec![0i64; n + 1]; m + 1];
    let mut b = vec![vec![""; n + 1]; m + 1];
    let snapshot = |c: &[Vec<i64>], b: &[Vec<&str>], current: Value, highlights: Value, msg: String| {
        json!({
            "c_table": c,
            "b_table": b,
            "text1": req.text1,
            "text2": req.text2,
            "current": current,
            "highlights": highlights,
            "msg": msg,
        })
    };
    let mut steps = vec![snapshot(&c, &b, Value::Null, json!([]), "初始化 LCS 表格，第一列與第一行為 0。".to_string())];

    for i in 1..=m {
        for j in 1..=n {
            let (highlights, msg) = if x[i - 1] == y[j - 1] {
                c[i][j] = c[i - 1][j - 1] + 1;
                b[i][j] = "↖";
                (
                    json!([{"r": i - 1, "c": j - 1, "color": "#aaffaa", "label": format!("c[{}][{}]", i - 1, j - 1)}]),
                    format!("X[{i}] == Y[{j}] ('{}')，c[{i}][{j}] = {} (↖)。", x[i - 1], c[i][j]),
                )
            } else {
                let up_wins = c[i - 1][j] >= c[i][j - 1];
                let (up, left) = if up_wins { ("#aaddff", "#eeeeee") } else { ("#eeeeee", "#aaddff") };
                c[i][j] = c[i - 1][j].max(c[i][j - 1]);
                b[i][j] = if up_wins { "↑" } else { "←" };
                (
                    json!([
                        {"r": i - 1, "c": j, "color": up, "label": format!("c[{}][{j}]", i - 1)},
                        {"r": i, "c": j - 1, "color": left, "label": format!("c[{i}][{}]", j - 1)},
                    ]),
                    format!("X[{i}] != Y[{j}]，取上方與左方較大者，c[{i}][{j}] = {} ({})。", c[i][j], b[i][j]),
                )
            };
            steps.push(snapshot(&c, &b, json!({"r": i, "c": j}), highlights, msg));
        }
    }

    let mut path = Vec::new();
    let mut common = Vec::new();
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        path.push(json!({"r": i, "c": j, "color": "#ffcc00", "type": "path"}));
        match b[i][j] {
            "↖" => {
                common.push(x[i - 1]);
                i -= 1;
                j -= 1;
            }
            "↑" => i -= 1,
            _ => j -= 1,
        }
    }
    let result: String = common.iter().rev().collect();
    let msg = format!("計算完成，LCS 長度為 {}，最長共同子序列為 {result}。", c[m][n]);
    steps.push(snapshot(&c, &b, Value::Null, Value::Array(path), msg));
    steps
}
