//! 步骤合成器
//!
//! 每个非空行生成一个 Step：描述、合成变量表、合成内存单元、合成调用栈。
//! 数据并非来自真实执行，而是按 (行号, 行文本, 类别) 套用闭式公式得到的演示数据；
//! 同样的输入总是得到完全相同的输出。

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::category::Category;

/// 变量表：保持插入顺序（serde_json preserve_order）
pub type Variables = Map<String, Value>;

/// 调用栈底帧
pub const BASE_FRAME: &str = "main()";
/// functions 类别在 i > 2 时追加的固定帧
pub const HELPER_FRAME: &str = "helper_function()";

const ARRAY_LEN: usize = 5;
const ARRAY_MEMORY_CELLS: usize = 8;
const ARRAY_BASE_ADDRESS: usize = 1000;
const ARRAY_CELL_WIDTH: usize = 4;
const VARIABLE_BASE_ADDRESS: usize = 2000;
const VARIABLE_CELL_WIDTH: usize = 8;

/// 内存单元的类型标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Int,
    Variable,
}

/// 合成内存单元：数组槽位带 index，具名变量带 name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryCell {
    pub address: String,
    pub value: Value,
    #[serde(rename = "type")]
    pub kind: CellKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 单个非空源码行对应的执行快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    /// 在非空行中的 1-based 位置
    pub line_number: usize,
    pub description: String,
    pub variables: Variables,
    pub memory_cells: Vec<MemoryCell>,
    /// 最内层在末尾
    pub call_stack: Vec<String>,
    pub highlighted_text: String,
    pub category: Category,
}

/// `0x` + 十六进制地址（小写、无前导零）
pub fn format_address(address: usize) -> String {
    format!("0x{address:x}")
}

/// 按 `\n` 拆分并丢弃空白行，保持原顺序
pub fn non_blank_lines(source: &str) -> impl Iterator<Item = &str> {
    source.split('\n').filter(|line| !line.trim().is_empty())
}

/// 生成步骤序列：长度等于非空行数，lineNumber 从 1 递增，类别在整个序列中一致
pub fn synthesize(source: &str, category: Category) -> Vec<Step> {
    non_blank_lines(source)
        .enumerate()
        .map(|(index, line)| synthesize_step(line, index, category))
        .collect()
}

fn synthesize_step(line: &str, index: usize, category: Category) -> Step {
    let highlighted = line.trim().to_string();
    Step {
        id: format!("step-{index}"),
        line_number: index + 1,
        description: format!("Executing: {highlighted}"),
        variables: variables_for(line, index, category),
        memory_cells: memory_for(line, index, category),
        call_stack: call_stack_for(line, index, category),
        highlighted_text: highlighted,
        category,
    }
}

/// 赋值行：含 `=` 且不含 `==`，在第一个 `=` 处切分一次
fn parse_assignment(line: &str) -> Option<(String, Value)> {
    if !line.contains('=') || line.contains("==") {
        return None;
    }
    let (name, value) = line.split_once('=')?;
    Some((name.trim().to_string(), evaluate_value(value.trim())))
}

/// 右值求值：带引号 → 去引号字符串；数字 → number；True/False → bool；否则原样文本
pub fn evaluate_value(raw: &str) -> Value {
    if raw.contains('"') || raw.contains('\'') {
        return Value::String(raw.replace(['"', '\''], ""));
    }
    if let Some(number) = parse_number(raw) {
        return Value::Number(number);
    }
    match raw {
        "True" => Value::Bool(true),
        "False" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    // 空右值按 0 处理
    if raw.is_empty() {
        return Some(0.into());
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Some(int.into());
    }
    let float = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
    // 整数值的小数（如 5.0）按整数呈现
    if float.fract() == 0.0 && float.abs() < 9_007_199_254_740_992.0 {
        return Some((float as i64).into());
    }
    Number::from_f64(float)
}

fn range_limit(line: &str) -> Option<i64> {
    static RANGE_RE: OnceLock<Regex> = OnceLock::new();
    let re = RANGE_RE.get_or_init(|| Regex::new(r"range\((\d+)\)").expect("valid range regex"));
    re.captures(line)?.get(1)?.as_str().parse().ok()
}

fn def_name(line: &str) -> Option<&str> {
    static DEF_RE: OnceLock<Regex> = OnceLock::new();
    let re = DEF_RE.get_or_init(|| Regex::new(r"def\s+(\w+)").expect("valid def regex"));
    Some(re.captures(line)?.get(1)?.as_str())
}

fn array_slot(slot: usize, index: usize) -> Value {
    if slot <= index {
        Value::from(slot * 2)
    } else {
        Value::Null
    }
}

fn variables_for(line: &str, index: usize, category: Category) -> Variables {
    let mut vars = Variables::new();
    match category {
        Category::Variables => {
            if let Some((name, value)) = parse_assignment(line) {
                vars.insert(name, value);
            }
        }
        Category::Loops => {
            vars.insert("i".into(), Value::from(index % 10));
            vars.insert("count".into(), Value::from(index));
            if line.contains("range(") {
                if let Some(limit) = range_limit(line) {
                    vars.insert("range_limit".into(), Value::from(limit));
                }
            }
        }
        Category::Arrays => {
            let arr = (0..ARRAY_LEN).map(|slot| array_slot(slot, index)).collect();
            vars.insert("arr".into(), Value::Array(arr));
            vars.insert("index".into(), Value::from(index % ARRAY_LEN));
        }
        Category::Dictionaries => {
            let mut dict = Map::new();
            dict.insert("key1".into(), Value::from(index));
            dict.insert("key2".into(), Value::String(format!("value_{index}")));
            dict.insert("key3".into(), Value::from(index * 2));
            vars.insert("dict".into(), Value::Object(dict));
        }
        Category::Functions
        | Category::ControlFlow
        | Category::FileHandling
        | Category::ErrorHandling
        | Category::Modules => {}
    }
    vars
}

fn memory_for(line: &str, index: usize, category: Category) -> Vec<MemoryCell> {
    match category {
        Category::Arrays => (0..ARRAY_MEMORY_CELLS)
            .map(|slot| MemoryCell {
                address: format_address(ARRAY_BASE_ADDRESS + slot * ARRAY_CELL_WIDTH),
                value: if slot < ARRAY_LEN {
                    array_slot(slot, index)
                } else {
                    Value::Null
                },
                kind: CellKind::Int,
                index: Some(slot),
                name: None,
            })
            .collect(),
        Category::Variables => parse_assignment(line)
            .map(|(name, value)| MemoryCell {
                address: format_address(VARIABLE_BASE_ADDRESS + index * VARIABLE_CELL_WIDTH),
                value,
                kind: CellKind::Variable,
                index: None,
                name: Some(name),
            })
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

fn call_stack_for(line: &str, index: usize, category: Category) -> Vec<String> {
    let mut stack = vec![BASE_FRAME.to_string()];
    if category == Category::Functions {
        if line.contains("def ") {
            let name = def_name(line).unwrap_or("function");
            stack.push(format!("{name}()"));
        }
        if index > 2 {
            stack.push(HELPER_FRAME.to_string());
        }
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::classify;
    use serde_json::json;

    #[test]
    fn test_step_count_matches_non_blank_lines() {
        let src = "x = 1\n\n   \ny = 2\n\tz = 3\n";
        let steps = synthesize(src, classify(src));
        assert_eq!(steps.len(), 3);
        let numbers: Vec<usize> = steps.iter().map(|s| s.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(steps[2].id, "step-2");
        assert_eq!(steps[2].highlighted_text, "z = 3");
        assert_eq!(steps[2].description, "Executing: z = 3");
    }

    #[test]
    fn test_empty_source_has_no_steps() {
        assert!(synthesize("", Category::Variables).is_empty());
        assert!(synthesize(" \n \n", Category::Loops).is_empty());
    }

    #[test]
    fn test_variables_scenario() {
        let src = "x = 5\ny = 'hello'";
        let category = classify(src);
        assert_eq!(category, Category::Variables);
        let steps = synthesize(src, category);
        assert_eq!(Value::Object(steps[0].variables.clone()), json!({"x": 5}));
        assert_eq!(Value::Object(steps[1].variables.clone()), json!({"y": "hello"}));
    }

    #[test]
    fn test_variables_memory_cell_per_assignment() {
        let steps = synthesize("x = 5\nprint(x)\nflag = True", Category::Variables);
        assert_eq!(steps[0].memory_cells.len(), 1);
        assert_eq!(steps[0].memory_cells[0].address, "0x7d0");
        assert_eq!(steps[0].memory_cells[0].name.as_deref(), Some("x"));
        assert!(steps[1].memory_cells.is_empty());
        assert!(steps[1].variables.is_empty());
        // 2000 + 2 * 8 = 2016 = 0x7e0
        assert_eq!(steps[2].memory_cells[0].address, "0x7e0");
        assert_eq!(steps[2].variables["flag"], json!(true));
    }

    #[test]
    fn test_comparison_is_not_assignment() {
        let steps = synthesize("x == 5", Category::Variables);
        assert!(steps[0].variables.is_empty());
        assert!(steps[0].memory_cells.is_empty());
    }

    #[test]
    fn test_assignment_splits_on_first_equals() {
        let steps = synthesize("a = b = 3", Category::Variables);
        assert_eq!(steps[0].variables["a"], json!("b = 3"));
    }

    #[test]
    fn test_evaluate_value() {
        assert_eq!(evaluate_value("\"hi\""), json!("hi"));
        assert_eq!(evaluate_value("'it'"), json!("it"));
        assert_eq!(evaluate_value("42"), json!(42));
        assert_eq!(evaluate_value("-7"), json!(-7));
        assert_eq!(evaluate_value("5.0"), json!(5));
        assert_eq!(evaluate_value("2.5"), json!(2.5));
        assert_eq!(evaluate_value("False"), json!(false));
        assert_eq!(evaluate_value("len(items)"), json!("len(items)"));
        assert_eq!(evaluate_value("inf"), json!("inf"));
        assert_eq!(evaluate_value(""), json!(0));
    }

    #[test]
    fn test_empty_right_hand_side_is_zero() {
        let steps = synthesize("x =", Category::Variables);
        assert_eq!(steps[0].variables["x"], json!(0));
        assert_eq!(steps[0].memory_cells[0].value, json!(0));
    }

    #[test]
    fn test_loops_scenario() {
        let src = "for i in range(3):\n    print(i)";
        let category = classify(src);
        assert_eq!(category, Category::Loops);
        let steps = synthesize(src, category);
        assert_eq!(steps[0].variables["range_limit"], json!(3));
        assert_eq!(steps[0].variables["i"], json!(0));
        assert!(!steps[1].variables.contains_key("range_limit"));
        assert_eq!(steps[1].variables["count"], json!(1));
        let keys: Vec<&String> = steps[0].variables.keys().collect();
        assert_eq!(keys, vec!["i", "count", "range_limit"]);
    }

    #[test]
    fn test_loops_counter_wraps() {
        let src = (0..12).map(|n| format!("s{n}")).collect::<Vec<_>>().join("\n");
        let steps = synthesize(&src, Category::Loops);
        assert_eq!(steps[11].variables["i"], json!(1));
        assert_eq!(steps[11].variables["count"], json!(11));
    }

    #[test]
    fn test_arrays_layout() {
        let steps = synthesize("a = [1]\nb = a[0]\nc = 1", Category::Arrays);
        assert_eq!(steps[0].variables["arr"], json!([0, null, null, null, null]));
        assert_eq!(steps[2].variables["arr"], json!([0, 2, 4, null, null]));
        assert_eq!(steps[2].variables["index"], json!(2));
        let cells = &steps[2].memory_cells;
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0].address, "0x3e8");
        assert_eq!(cells[7].address, "0x404");
        assert_eq!(cells[2].value, json!(4));
        assert_eq!(cells[3].value, Value::Null);
        assert_eq!(cells[6].index, Some(6));
    }

    #[test]
    fn test_arrays_tail_cells_stay_null() {
        let src = (0..8).map(|n| format!("x[{n}]")).collect::<Vec<_>>().join("\n");
        let steps = synthesize(&src, Category::Arrays);
        let last = &steps[7].memory_cells;
        assert_eq!(last[4].value, json!(8));
        assert_eq!(last[5].value, Value::Null);
        assert_eq!(last[7].value, Value::Null);
    }

    #[test]
    fn test_dictionaries_mapping() {
        let steps = synthesize("d = {'a': 1}\nd['b'] = 2", Category::Dictionaries);
        assert_eq!(
            steps[1].variables["dict"],
            json!({"key1": 1, "key2": "value_1", "key3": 2})
        );
        assert!(steps[1].memory_cells.is_empty());
    }

    #[test]
    fn test_functions_call_stack() {
        let src = "def fib(n):\n    return n\nx = 1\ny = 2\ndef  other():";
        let steps = synthesize(src, Category::Functions);
        assert_eq!(steps[0].call_stack, vec!["main()", "fib()"]);
        assert_eq!(steps[1].call_stack, vec!["main()"]);
        assert_eq!(steps[3].call_stack, vec!["main()", "helper_function()"]);
        assert_eq!(
            steps[4].call_stack,
            vec!["main()", "other()", "helper_function()"]
        );
    }

    #[test]
    fn test_other_categories_only_base_frame() {
        for category in [
            Category::ControlFlow,
            Category::FileHandling,
            Category::ErrorHandling,
            Category::Modules,
        ] {
            let steps = synthesize("import os\nx = [1]\ndef f():", category);
            for step in &steps {
                assert!(step.variables.is_empty());
                assert!(step.memory_cells.is_empty());
                assert_eq!(step.call_stack, vec![BASE_FRAME]);
                assert_eq!(step.category, category);
            }
        }
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let src = "nums = [3, 1, 2]\nfor n in nums:\n    print(n)\n";
        let category = classify(src);
        assert_eq!(synthesize(src, category), synthesize(src, category));
    }

    #[test]
    fn test_step_serializes_camel_case() {
        let steps = synthesize("x = 1", Category::Variables);
        let value = serde_json::to_value(&steps[0]).unwrap();
        assert_eq!(value["lineNumber"], json!(1));
        assert_eq!(value["memoryCells"][0]["type"], json!("variable"));
        assert_eq!(value["category"], json!("variables"));
        assert!(value["memoryCells"][0].get("index").is_none());
    }
}
